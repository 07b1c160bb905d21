use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub enum Price {
    Known(f64),
    #[default]
    Unknown,
}

impl Price {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Price::Known(value)
        } else {
            Price::Unknown
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Known(value) if value.fract() == 0.0 => write!(formatter, "{value:.0}"),
            Price::Known(value) => write!(formatter, "{value:.2}"),
            Price::Unknown => write!(formatter, "—"),
        }
    }
}

impl From<Option<f64>> for Price {
    fn from(value: Option<f64>) -> Self {
        value.map(Price::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_are_unknown() {
        assert_eq!(Price::new(f64::NAN), Price::Unknown);
        assert_eq!(Price::new(f64::INFINITY), Price::Unknown);
    }

    #[test]
    fn display_drops_fraction_for_whole_prices() {
        assert_eq!(Price::new(10.0).to_string(), "10");
        assert_eq!(Price::new(2.5).to_string(), "2.50");
        assert_eq!(Price::Unknown.to_string(), "—");
    }
}
