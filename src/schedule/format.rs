// Conversions between the service's wire encodings (MM/DD/YYYY, 12-hour
// HH:MM AM/PM) and the edit encodings the form uses (YYYY-MM-DD, 24-hour
// HH:MM). Malformed input degrades to an empty string, never a panic.

pub fn date_to_edit(wire: &str) -> String {
    let parts: Vec<&str> = wire.split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return String::new();
    };
    if !all_digits(month) || !all_digits(day) || !all_digits(year) {
        return String::new();
    }
    format!("{year}-{month:0>2}-{day:0>2}")
}

pub fn date_to_wire(edit: &str) -> String {
    let parts: Vec<&str> = edit.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return String::new();
    };
    if !all_digits(year) || !all_digits(month) || !all_digits(day) {
        return String::new();
    }
    format!("{month:0>2}/{day:0>2}/{year}")
}

pub fn time_to_edit(wire: &str) -> String {
    let Some((clock, period)) = wire.split_once(' ') else {
        return String::new();
    };
    let is_pm = if period.eq_ignore_ascii_case("PM") {
        true
    } else if period.eq_ignore_ascii_case("AM") {
        false
    } else {
        return String::new();
    };
    let Some((hour_text, minute)) = clock.split_once(':') else {
        return String::new();
    };
    let Ok(hour12) = hour_text.parse::<u32>() else {
        return String::new();
    };
    if !(1..=12).contains(&hour12) || !is_valid_minute(minute) {
        return String::new();
    }

    // 12 AM is midnight, 12 PM is noon.
    let hour24 = match (is_pm, hour12) {
        (false, 12) => 0,
        (false, hour) => hour,
        (true, 12) => 12,
        (true, hour) => hour + 12,
    };
    format!("{hour24:02}:{minute}")
}

pub fn time_to_wire(edit: &str) -> String {
    let Some((hour_text, minute)) = edit.split_once(':') else {
        return String::new();
    };
    let Ok(hour24) = hour_text.parse::<u32>() else {
        return String::new();
    };
    if hour24 > 23 || !is_valid_minute(minute) {
        return String::new();
    }

    let period = if hour24 >= 12 { "PM" } else { "AM" };
    // Noon and midnight both render as "12".
    let hour12 = match hour24 % 12 {
        0 => 12,
        hour => hour,
    };
    format!("{hour12:02}:{minute} {period}")
}

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn is_valid_minute(minute: &str) -> bool {
    minute.len() == 2
        && all_digits(minute)
        && minute.parse::<u32>().map(|value| value < 60).unwrap_or(false)
}
