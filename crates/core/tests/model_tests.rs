// ═══════════════════════════════════════════════════════════════════
// Model Tests — Theme, SettingKey, Settings, QuoteRow, FetchOutcome
// ═══════════════════════════════════════════════════════════════════

use std::time::Duration;

use mini_dash_core::errors::CoreError;
use mini_dash_core::models::quote::{
    format_price, truncate_date, Coin, CoinQuote, FetchFailure, FetchOutcome, QuoteRow,
    TableUpdate, UsdQuote, COLUMNS,
};
use mini_dash_core::models::settings::{
    SettingKey, Settings, Theme, API_KEY_PLACEHOLDER, DEFAULT_PORTFOLIO_ID,
};

fn coin(id: u64, symbol: &str, last_updated: Option<&str>, price: Option<f64>) -> Coin {
    Coin {
        id,
        symbol: symbol.to_string(),
        name: format!("{symbol} coin"),
        last_updated: last_updated.map(str::to_string),
        quote: CoinQuote {
            usd: Some(UsdQuote { price }),
        },
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Theme
// ═══════════════════════════════════════════════════════════════════

mod theme {
    use super::*;

    #[test]
    fn catalog_order() {
        let names: Vec<&str> = Theme::ALL.iter().map(Theme::as_str).collect();
        assert_eq!(
            names,
            ["vapor", "darkly", "morph", "minty", "superhero", "solar", "cosmo", "journal"]
        );
    }

    #[test]
    fn parse_every_catalog_name() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("Cosmo".parse::<Theme>().is_err());
    }

    #[test]
    fn parse_unknown_is_validation_error() {
        let err = "neon".parse::<Theme>().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("neon")));
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Theme::Superhero.to_string(), "superhero");
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Solar).unwrap(), "\"solar\"");
        let t: Theme = serde_json::from_str("\"journal\"").unwrap();
        assert_eq!(t, Theme::Journal);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  SettingKey
// ═══════════════════════════════════════════════════════════════════

mod setting_key {
    use super::*;

    #[test]
    fn file_key_names() {
        assert_eq!(SettingKey::ApiKey.as_str(), "API_KEY");
        assert_eq!(SettingKey::PortfolioId.as_str(), "ID_PORTAFOLIO");
        assert_eq!(SettingKey::HotReload.as_str(), "HOT_RELOAD");
        assert_eq!(SettingKey::ColorTheme.as_str(), "Color Tema");
    }

    #[test]
    fn parse_round_trips_names() {
        for key in SettingKey::ALL {
            assert_eq!(key.to_string().parse::<SettingKey>().unwrap(), key);
        }
    }

    #[test]
    fn parse_unknown_key() {
        assert!("THEME".parse::<SettingKey>().is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.api_key, "");
        assert_eq!(s.portfolio_id, DEFAULT_PORTFOLIO_ID);
        assert_eq!(s.hot_reload, Some(10));
        assert_eq!(s.theme, Theme::Cosmo);
        assert!(!s.has_api_key());
    }

    #[test]
    fn serializes_with_file_key_names() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["API_KEY"], "");
        assert_eq!(obj["ID_PORTAFOLIO"], DEFAULT_PORTFOLIO_ID);
        assert_eq!(obj["HOT_RELOAD"], 10);
        assert_eq!(obj["Color Tema"], "cosmo");
    }

    #[test]
    fn deserializes_file_record() {
        let s: Settings = serde_json::from_str(
            r#"{"API_KEY": "abc", "ID_PORTAFOLIO": "x", "HOT_RELOAD": 15, "Color Tema": "minty"}"#,
        )
        .unwrap();
        assert_eq!(s.api_key, "abc");
        assert_eq!(s.portfolio_id, "x");
        assert_eq!(s.hot_reload, Some(15));
        assert_eq!(s.theme, Theme::Minty);
    }

    #[test]
    fn missing_key_is_rejected() {
        let result: Result<Settings, _> = serde_json::from_str(
            r#"{"API_KEY": "abc", "ID_PORTAFOLIO": "x", "Color Tema": "minty"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let result: Result<Settings, _> = serde_json::from_str(
            r#"{"API_KEY": "", "ID_PORTAFOLIO": "x", "HOT_RELOAD": 10, "Color Tema": "neon"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn hot_reload_accepts_numeric_string() {
        let s: Settings = serde_json::from_str(
            r#"{"API_KEY": "", "ID_PORTAFOLIO": "x", "HOT_RELOAD": "20", "Color Tema": "cosmo"}"#,
        )
        .unwrap();
        assert_eq!(s.hot_reload, Some(20));
    }

    #[test]
    fn hot_reload_empty_string_is_unset() {
        let s: Settings = serde_json::from_str(
            r#"{"API_KEY": "", "ID_PORTAFOLIO": "x", "HOT_RELOAD": "", "Color Tema": "cosmo"}"#,
        )
        .unwrap();
        assert_eq!(s.hot_reload, None);
        assert_eq!(s.get(SettingKey::HotReload), "");
        assert_eq!(s.refresh_interval(), Duration::from_secs(10));
    }

    #[test]
    fn unset_hot_reload_serializes_as_empty_string() {
        let mut s = Settings::default();
        s.hot_reload = None;
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["HOT_RELOAD"], "");
    }

    #[test]
    fn hot_reload_rejects_negative_and_text() {
        for raw in [r#"-5"#, r#""soon""#, r#"true"#] {
            let json = format!(
                r#"{{"API_KEY": "", "ID_PORTAFOLIO": "x", "HOT_RELOAD": {raw}, "Color Tema": "cosmo"}}"#
            );
            assert!(serde_json::from_str::<Settings>(&json).is_err(), "{raw} accepted");
        }
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let mut s = Settings::default();
        s.hot_reload = Some(1);
        assert_eq!(s.refresh_interval(), Duration::from_secs(5));
        s.hot_reload = Some(300);
        assert_eq!(s.refresh_interval(), Duration::from_secs(30));
        s.hot_reload = Some(12);
        assert_eq!(s.refresh_interval(), Duration::from_secs(12));
    }

    #[test]
    fn set_normalizes_empty_and_placeholder_for_non_theme_keys() {
        for key in [SettingKey::ApiKey, SettingKey::PortfolioId, SettingKey::HotReload] {
            for value in ["", API_KEY_PLACEHOLDER] {
                let mut s = Settings::default();
                s.set(key, value).unwrap();
                assert_eq!(s.get(key), "", "{key} with {value:?}");
            }
        }
    }

    #[test]
    fn set_theme_is_not_normalized() {
        let mut s = Settings::default();
        assert!(s.set(SettingKey::ColorTheme, "").is_err());
        assert!(s.set(SettingKey::ColorTheme, API_KEY_PLACEHOLDER).is_err());
        assert_eq!(s.theme, Theme::Cosmo);
    }

    #[test]
    fn set_only_touches_its_key() {
        let original = Settings::default();
        let mut s = original.clone();
        s.set(SettingKey::PortfolioId, "abc123").unwrap();
        assert_eq!(s.portfolio_id, "abc123");
        assert_eq!(s.api_key, original.api_key);
        assert_eq!(s.hot_reload, original.hot_reload);
        assert_eq!(s.theme, original.theme);
    }

    #[test]
    fn set_hot_reload_clamps() {
        let mut s = Settings::default();
        s.set(SettingKey::HotReload, "2").unwrap();
        assert_eq!(s.hot_reload, Some(5));
        s.set(SettingKey::HotReload, "45").unwrap();
        assert_eq!(s.hot_reload, Some(30));
        s.set(SettingKey::HotReload, " 8 ").unwrap();
        assert_eq!(s.hot_reload, Some(8));
    }

    #[test]
    fn set_hot_reload_rejects_text() {
        let mut s = Settings::default();
        let err = s.set(SettingKey::HotReload, "ten").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(s.hot_reload, Some(10));
    }

    #[test]
    fn get_reports_textual_values() {
        let mut s = Settings::default();
        s.api_key = "k".into();
        assert_eq!(s.get(SettingKey::ApiKey), "k");
        assert_eq!(s.get(SettingKey::PortfolioId), DEFAULT_PORTFOLIO_ID);
        assert_eq!(s.get(SettingKey::HotReload), "10");
        assert_eq!(s.get(SettingKey::ColorTheme), "cosmo");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Quote rows
// ═══════════════════════════════════════════════════════════════════

mod quote_row {
    use super::*;

    #[test]
    fn date_is_truncated_to_calendar_day() {
        assert_eq!(truncate_date("2024-03-15T10:00:00.000Z"), "2024-03-15");
    }

    #[test]
    fn short_date_is_kept_whole() {
        assert_eq!(truncate_date("2024-03"), "2024-03");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_date("ñññññññññññ"), "ññññññññññ");
    }

    #[test]
    fn price_two_decimals() {
        assert_eq!(format_price(Some(64250.123)), "64250.12");
        assert_eq!(format_price(Some(1.0)), "1.00");
        assert_eq!(format_price(Some(0.000123)), "0.00");
    }

    #[test]
    fn missing_price_is_na() {
        assert_eq!(format_price(None), "N/A");
    }

    #[test]
    fn row_from_coin() {
        let row = QuoteRow::from(&coin(1, "BTC", Some("2024-03-15T10:00:00.000Z"), Some(64250.5)));
        assert_eq!(row.id, "1");
        assert_eq!(row.symbol, "BTC");
        assert_eq!(row.name, "BTC coin");
        assert_eq!(row.last_updated_date, "2024-03-15");
        assert_eq!(row.price_usd, "64250.50");
    }

    #[test]
    fn row_from_coin_with_null_price() {
        let row = QuoteRow::from(&coin(7, "XYZ", Some("2024-03-15T10:00:00.000Z"), None));
        assert_eq!(row.price_usd, "N/A");
    }

    #[test]
    fn row_from_coin_without_usd_quote() {
        let mut c = coin(7, "XYZ", None, Some(1.0));
        c.quote = CoinQuote::default();
        let row = QuoteRow::from(&c);
        assert_eq!(row.price_usd, "N/A");
        assert_eq!(row.last_updated_date, "");
    }

    #[test]
    fn sentinel_row() {
        let row = QuoteRow::sentinel();
        assert_eq!(row.cells(), ["Ve", "a", "Configuracion", "", ""]);
    }

    #[test]
    fn cells_follow_column_order() {
        assert_eq!(COLUMNS.len(), QuoteRow::sentinel().cells().len());
        assert_eq!(COLUMNS[0], "ID");
        assert_eq!(COLUMNS[4], "Precio USD");
    }

    #[test]
    fn coin_deserializes_provider_shape() {
        let c: Coin = serde_json::from_str(
            r#"{"id": 1027, "symbol": "ETH", "name": "Ethereum", "slug": "ethereum",
                "last_updated": "2024-03-15T10:00:00.000Z",
                "quote": {"USD": {"price": 3500.987, "volume_24h": 1.0}}}"#,
        )
        .unwrap();
        assert_eq!(c.id, 1027);
        assert_eq!(c.price_usd(), Some(3500.987));
    }

    #[test]
    fn coin_with_null_price_deserializes() {
        let c: Coin = serde_json::from_str(
            r#"{"id": 5, "symbol": "N", "name": "Null", "last_updated": null,
                "quote": {"USD": {"price": null}}}"#,
        )
        .unwrap();
        assert_eq!(c.price_usd(), None);
        assert_eq!(c.last_updated, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  FetchOutcome / TableUpdate
// ═══════════════════════════════════════════════════════════════════

mod fetch_outcome {
    use super::*;

    #[test]
    fn success_rows_one_per_coin() {
        let outcome = FetchOutcome::Success(vec![
            coin(1, "BTC", Some("2024-03-15T10:00:00.000Z"), Some(1.0)),
            coin(2, "ETH", Some("2024-03-16T10:00:00.000Z"), None),
        ]);
        let rows = outcome.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].price_usd, "N/A");
        assert!(outcome.is_success());
        assert!(outcome.failure().is_none());
    }

    #[test]
    fn empty_success_has_no_rows() {
        assert!(FetchOutcome::Success(vec![]).rows().is_empty());
    }

    #[test]
    fn every_failure_yields_single_sentinel() {
        let failures = [
            FetchFailure::InvalidKey,
            FetchFailure::NonSuccess { status: 500 },
            FetchFailure::Network("refused".into()),
            FetchFailure::Malformed("eof".into()),
            FetchFailure::ConfigUnreadable("missing field".into()),
        ];
        for failure in failures {
            let outcome = FetchOutcome::Failure(failure.clone());
            assert_eq!(outcome.rows(), vec![QuoteRow::sentinel()]);
            assert_eq!(outcome.failure(), Some(&failure));
        }
    }

    #[test]
    fn failure_display() {
        assert_eq!(FetchFailure::InvalidKey.to_string(), "API key missing or rejected");
        assert_eq!(
            FetchFailure::NonSuccess { status: 429 }.to_string(),
            "Quote request failed with HTTP 429"
        );
        assert_eq!(
            FetchFailure::ConfigUnreadable("EOF".into()).to_string(),
            "Settings unavailable: EOF"
        );
    }

    #[test]
    fn table_update_carries_failure() {
        let update = TableUpdate::from_outcome(&FetchOutcome::Failure(FetchFailure::InvalidKey));
        assert_eq!(update.rows, vec![QuoteRow::sentinel()]);
        assert_eq!(update.failure, Some(FetchFailure::InvalidKey));
    }
}
