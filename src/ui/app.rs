use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use eframe::egui::{self, Align, Color32, Layout, RichText, ScrollArea, TextEdit, TopBottomPanel, Ui};

use crate::controller::{MessageKind, PanelController, SessionState};
use crate::schedule::model::PauseState;

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_gui(controller: PanelController, api_url: String) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tee Time Panel")
            .with_inner_size([920.0, 640.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };

    let mut app = PanelApp {
        controller,
        api_url,
    };
    // Mirrors the page-load fetch: the panel opens with the service's
    // current window already in the form.
    app.controller.start_load();

    eframe::run_native(
        "Tee Time Panel",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch panel GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(228, 234, 240));
    visuals.panel_fill = Color32::from_rgb(12, 20, 16);
    visuals.window_fill = Color32::from_rgb(16, 26, 20);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(14, 24, 18);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(22, 34, 26);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(34, 54, 42);
    visuals.widgets.active.bg_fill = Color32::from_rgb(46, 76, 58);
    visuals.selection.bg_fill = Color32::from_rgb(52, 148, 96);
    ctx.set_visuals(visuals);
}

struct PanelApp {
    controller: PanelController,
    api_url: String,
}

impl PanelApp {
    fn busy_label(&self) -> Option<&'static str> {
        match self.controller.state() {
            SessionState::Idle => None,
            SessionState::Loading => Some("loading configuration..."),
            SessionState::Submitting => Some("updating configuration..."),
            SessionState::Toggling => Some("toggling scraper pause..."),
            SessionState::Checking => Some("fetching cached results..."),
            SessionState::Launching => Some("starting scraper..."),
        }
    }

    fn show_header(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("Tee Time Panel")
                    .size(24.0)
                    .color(Color32::from_rgb(120, 228, 170))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(Local::now().format("%H:%M:%S").to_string())
                    .size(20.0)
                    .color(Color32::from_rgb(255, 214, 117))
                    .strong(),
            );
            ui.separator();
            let (pause_text, pause_color) = match self.controller.pause() {
                PauseState::Unknown => ("SCRAPER UNKNOWN", Color32::from_rgb(160, 168, 176)),
                PauseState::Running => ("SCRAPER RUNNING", Color32::from_rgb(108, 228, 138)),
                PauseState::Paused => ("SCRAPER PAUSED", Color32::from_rgb(255, 183, 95)),
            };
            ui.label(RichText::new(pause_text).color(pause_color).strong());
            if let Some(busy) = self.busy_label() {
                ui.separator();
                ui.label(
                    RichText::new(busy)
                        .color(Color32::from_rgb(160, 200, 220))
                        .italics(),
                );
            }
        });

        if let Some(message) = self.controller.status() {
            let color = match message.kind {
                MessageKind::Neutral => Color32::from_rgb(170, 186, 200),
                MessageKind::Success => Color32::from_rgb(111, 228, 134),
                MessageKind::Error => Color32::from_rgb(255, 124, 124),
            };
            ui.label(RichText::new(&message.text).color(color).strong());
        }
    }

    fn show_window_form(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("Scheduling Window")
                .color(Color32::from_rgb(104, 221, 160))
                .strong(),
        );
        ui.add_space(4.0);

        if let Some(window) = self.controller.current() {
            ui.label(
                RichText::new(format!(
                    "Service has: {} {} - {}",
                    window.date, window.start, window.end
                ))
                .monospace()
                .color(Color32::from_rgb(170, 186, 200)),
            );
            if let Some(date) = window.parsed_date() {
                ui.label(
                    RichText::new(date.format("%A, %B %-d %Y").to_string())
                        .color(Color32::from_rgb(170, 186, 200)),
                );
            }
        } else {
            ui.label(
                RichText::new("No configuration loaded yet.")
                    .color(Color32::from_rgb(255, 190, 106)),
            );
        }
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.label("Date (YYYY-MM-DD)");
            ui.add(TextEdit::singleline(&mut self.controller.form.date).desired_width(110.0));
        });
        ui.horizontal(|ui| {
            ui.label("Start (HH:MM)");
            ui.add(TextEdit::singleline(&mut self.controller.form.start).desired_width(70.0));
        });
        ui.horizontal(|ui| {
            ui.label("End (HH:MM)");
            ui.add(TextEdit::singleline(&mut self.controller.form.end).desired_width(70.0));
        });
        ui.add_space(6.0);

        let idle = self.controller.is_idle();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    idle,
                    egui::Button::new(RichText::new("Update Window").strong())
                        .fill(Color32::from_rgb(26, 82, 52))
                        .min_size(egui::vec2(140.0, 26.0)),
                )
                .clicked()
            {
                self.controller.submit();
            }
            if ui
                .add_enabled(idle, egui::Button::new("Reload"))
                .clicked()
            {
                self.controller.start_load();
            }
        });
    }

    fn show_scraper_controls(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("Scraper")
                .color(Color32::from_rgb(104, 221, 160))
                .strong(),
        );
        ui.add_space(4.0);

        let idle = self.controller.is_idle();
        let toggle_text = match self.controller.pause() {
            PauseState::Paused => "Resume Scraper",
            PauseState::Running => "Pause Scraper",
            PauseState::Unknown => "Toggle Pause",
        };
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    idle,
                    egui::Button::new(RichText::new(toggle_text).strong())
                        .fill(Color32::from_rgb(82, 62, 26))
                        .min_size(egui::vec2(140.0, 26.0)),
                )
                .clicked()
            {
                self.controller.toggle_pause();
            }
            if ui
                .add_enabled(idle, egui::Button::new("Run Scraper Now"))
                .clicked()
            {
                self.controller.launch_scraper();
            }
            if ui
                .add_enabled(idle, egui::Button::new("Check Availability"))
                .clicked()
            {
                self.controller.start_check();
            }
        });
    }

    fn show_results(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("Cached Availability")
                .color(Color32::from_rgb(104, 221, 160))
                .strong(),
        );
        ui.add_space(4.0);

        if self.controller.tee_times().is_empty() {
            ui.label(
                RichText::new("No cached results. Use Check Availability to fetch the latest.")
                    .color(Color32::from_rgb(160, 168, 176)),
            );
            return;
        }
        ScrollArea::vertical()
            .id_salt("results_scroll")
            .show(ui, |ui| {
                for line in self.controller.tee_times() {
                    ui.label(RichText::new(line).monospace());
                }
            });
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui));

        TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        RichText::new(format!("Service: {}", self.api_url))
                            .color(Color32::from_rgb(150, 186, 168)),
                    );
                    ui.separator();
                    ui.label(
                        RichText::new("Changes apply on the service immediately; the panel re-fetches after every update.")
                            .color(Color32::from_rgb(150, 168, 160)),
                    );
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Min), |ui| {
                self.show_window_form(ui);
                ui.separator();
                self.show_scraper_controls(ui);
                ui.separator();
                self.show_results(ui);
            });
        });

        // Keep polling while a request is in flight or a message is pending
        // expiry.
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
