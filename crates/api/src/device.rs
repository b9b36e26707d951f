//! Human-readable device descriptor stored on each session.

use std::sync::LazyLock;

use regex::Regex;

/// Browsers in match order; Edge and Opera also advertise Chrome.
static BROWSERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Edge", r"Edg(?:e|A|iOS)?/(\d+)"),
        ("Opera", r"(?:OPR|Opera)/(\d+)"),
        ("Firefox", r"(?:Firefox|FxiOS)/(\d+)"),
        ("Chrome", r"(?:Chrome|CriOS)/(\d+)"),
        ("Safari", r"Version/(\d+)[^ ]* (?:Mobile/\S+ )?Safari/"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid regex")))
    .collect()
});

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mobile|Android|iPhone|iPad").expect("valid regex"));

/// Describe the client behind `user_agent` as `"{browser} {version}, {os},
/// {Mobile|Desktop}"`, or `"Unknown"`.
pub fn describe_device(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return "Unknown".to_string();
    };

    let browser = BROWSERS
        .iter()
        .find_map(|(name, re)| {
            re.captures(ua)
                .and_then(|caps| caps.get(1))
                .map(|version| format!("{name} {}", version.as_str()))
        })
        .unwrap_or_else(|| "Unknown browser".to_string());

    let form = if MOBILE_RE.is_match(ua) {
        "Mobile"
    } else {
        "Desktop"
    };

    format!("{browser}, {}, {form}", operating_system(ua))
}

fn operating_system(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Mac OS X") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown OS"
    }
}
