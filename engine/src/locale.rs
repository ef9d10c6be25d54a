//! Locale presets: default patterns and the symbols `DateFormat` prints and reads.

/// Date symbols and default patterns of one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    tag: &'static str,
    date_pattern: &'static str,
    time_pattern: &'static str,
    months: [&'static str; 12],
    months_short: [&'static str; 12],
    am: &'static str,
    pm: &'static str,
}

const DE_CH: Locale = Locale {
    tag: "de-CH",
    date_pattern: "dd.MM.yyyy",
    time_pattern: "HH:mm",
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    months_short: [
        "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
    ],
    am: "AM",
    pm: "PM",
};

const EN_US: Locale = Locale {
    tag: "en-US",
    date_pattern: "MM/dd/yyyy",
    time_pattern: "h:mm a",
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    months_short: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    am: "AM",
    pm: "PM",
};

impl Locale {
    #[must_use]
    pub const fn de_ch() -> Self {
        DE_CH
    }

    #[must_use]
    pub const fn en_us() -> Self {
        EN_US
    }

    /// Look a preset up by its language tag (`de-CH`, `en-US`). Case-insensitive;
    /// `_` is accepted as separator.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.replace('_', "-");
        [DE_CH, EN_US]
            .into_iter()
            .find(|locale| locale.tag.eq_ignore_ascii_case(&tag))
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    #[must_use]
    pub fn date_pattern(&self) -> &'static str {
        self.date_pattern
    }

    #[must_use]
    pub fn time_pattern(&self) -> &'static str {
        self.time_pattern
    }

    #[must_use]
    pub fn months(&self) -> &[&'static str; 12] {
        &self.months
    }

    #[must_use]
    pub fn months_short(&self) -> &[&'static str; 12] {
        &self.months_short
    }

    #[must_use]
    pub fn am(&self) -> &'static str {
        self.am
    }

    #[must_use]
    pub fn pm(&self) -> &'static str {
        self.pm
    }
}

impl Default for Locale {
    fn default() -> Self {
        DE_CH
    }
}
