//! Locale preference and locale-aware number formatting.
//!
//! The locale only changes how amounts are displayed; stored records are
//! never rewritten.

use shared::{Locale, LocaleSettings};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::DomainResult;
use crate::storage::{RecordStore, PREFERENCE_PREFIX};

pub fn locale_key() -> String {
    format!("{}locale", PREFERENCE_PREFIX)
}

pub fn currency_suffix(locale: Locale) -> &'static str {
    match locale {
        Locale::Fr => "DA",
        Locale::Ar => "د.ج",
    }
}

/// Group thousands and keep at most two decimals, trailing zeros dropped
pub fn format_number(amount: f64, locale: Locale) -> String {
    let (group, decimal) = match locale {
        Locale::Fr => ('\u{202f}', ','),
        Locale::Ar => ('.', ','),
    };

    let cents = (amount.abs() * 100.0).round() as u128;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(group);
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if amount < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        let fraction = format!("{:02}", fraction);
        out.push(decimal);
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

pub fn format_currency(amount: f64, locale: Locale) -> String {
    format!("{} {}", format_number(amount, locale), currency_suffix(locale))
}

pub fn locale_settings(locale: Locale) -> LocaleSettings {
    LocaleSettings {
        locale,
        direction: locale.direction().to_string(),
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn RecordStore>,
    default_locale: Locale,
}

impl SettingsService {
    pub fn new(store: Arc<dyn RecordStore>, default_locale: Locale) -> Self {
        Self { store, default_locale }
    }

    pub async fn locale(&self) -> DomainResult<Locale> {
        let stored = self.store.get_setting(&locale_key()).await?;
        Ok(match stored.as_deref().map(Locale::from_code) {
            Some(Some(locale)) => locale,
            Some(None) => {
                warn!("Ignoring unknown stored locale {:?}", stored);
                self.default_locale
            }
            None => self.default_locale,
        })
    }

    pub async fn locale_settings(&self) -> DomainResult<LocaleSettings> {
        Ok(locale_settings(self.locale().await?))
    }

    pub async fn set_locale(&self, locale: Locale) -> DomainResult<LocaleSettings> {
        info!("Switching locale to {}", locale.code());
        self.store.put_setting(&locale_key(), locale.code()).await?;
        Ok(locale_settings(locale))
    }

    pub async fn format_currency(&self, amount: f64) -> DomainResult<String> {
        Ok(format_currency(amount, self.locale().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::store_as;
    use shared::Role;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(45000.0, Locale::Fr), "45\u{202f}000");
        assert_eq!(format_number(1234567.5, Locale::Fr), "1\u{202f}234\u{202f}567,5");
        assert_eq!(format_number(999.0, Locale::Ar), "999");
        assert_eq!(format_number(15000.25, Locale::Ar), "15.000,25");
        assert_eq!(format_number(-3500.0, Locale::Ar), "-3.500");
        assert_eq!(format_number(0.0, Locale::Fr), "0");
    }

    #[test]
    fn test_currency_suffix() {
        assert_eq!(format_currency(5000.0, Locale::Fr), "5\u{202f}000 DA");
        assert_eq!(format_currency(5000.0, Locale::Ar), "5.000 د.ج");
    }

    #[tokio::test]
    async fn test_locale_preference_defaults_and_persists() {
        // The director is read-only for records but may still pick a language
        let (store, _raw, _session) = store_as(Role::Director);
        let service = SettingsService::new(store, Locale::Fr);

        let settings = service.locale_settings().await.unwrap();
        assert_eq!(settings.locale, Locale::Fr);
        assert_eq!(settings.direction, "ltr");

        let settings = service.set_locale(Locale::Ar).await.unwrap();
        assert_eq!(settings.direction, "rtl");
        assert_eq!(service.locale().await.unwrap(), Locale::Ar);
        assert_eq!(service.format_currency(1500.0).await.unwrap(), "1.500 د.ج");
    }
}
