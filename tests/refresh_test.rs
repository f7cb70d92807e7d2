//! Refresh cycle tests against an in-memory provider.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use symbolwatch::config::FetchSettings;
use symbolwatch::layout::plan_layout;
use symbolwatch::models::Instrument;
use symbolwatch::refresh::{RefreshSession, SlotError, SlotState};

use common::{MockProvider, series};

fn session(provider: MockProvider, instruments: Vec<Instrument>) -> RefreshSession<MockProvider> {
    let layout = plan_layout(instruments.len(), 4, 2).unwrap();
    RefreshSession::new(provider, instruments, layout, "SEK", FetchSettings::default()).unwrap()
}

#[tokio::test]
async fn test_empty_series_is_isolated() {
    let provider = MockProvider::new()
        .with_series(series("SAAB-B.ST", Some("SEK"), &[dec!(400), dec!(410)]))
        .with_series(series("VOLV-B.ST", Some("SEK"), &[dec!(250), dec!(240)]));
    let session = session(
        provider.clone(),
        vec![
            Instrument::with_holding("SAAB-B.ST", dec!(2), dec!(300)),
            Instrument::with_holding("EMPTY.ST", dec!(100), dec!(1)),
            Instrument::with_holding("VOLV-B.ST", dec!(1), dec!(200)),
        ],
    );

    let report = session.refresh().await;

    assert_eq!(report.slots.len(), 3);
    assert!(matches!(report.slots[0], SlotState::Ready(_)));
    assert_eq!(report.slots[1].error(), Some(&SlotError::NoDataAvailable));
    assert!(matches!(report.slots[2], SlotState::Ready(_)));
    assert_eq!(report.summary.total_value, dec!(1060));
    assert_eq!(report.summary.total_value_change, dec!(260));
    assert_eq!(report.summary.instruments_with_data, 2);
    assert_eq!(report.summary.instruments_without_data, 1);
    assert_eq!(provider.calls(), vec!["SAAB-B.ST", "EMPTY.ST", "VOLV-B.ST"]);
}

#[tokio::test]
async fn test_intraday_change_uses_first_close() {
    let provider =
        MockProvider::new().with_series(series("AAPL", Some("SEK"), &[dec!(100), dec!(105), dec!(98)]));
    let session = session(provider, vec![Instrument::new("AAPL")]);

    let report = session.refresh().await;
    let metrics = report.slots[0].metrics().unwrap();

    assert_eq!(metrics.latest_close, dec!(98));
    assert_eq!(metrics.first_close, dec!(100));
    assert_eq!(metrics.intraday_change, dec!(-2));
    assert_eq!(metrics.intraday_change_pct, Some(dec!(-2)));
}

#[tokio::test]
async fn test_foreign_instrument_is_converted() {
    let provider = MockProvider::new()
        .with_series(series("AAPL", Some("USD"), &[dec!(11), dec!(12)]))
        .with_series(series("SEKUSD=X", Some("USD"), &[dec!(0.095), dec!(0.1)]));
    let session = session(
        provider.clone(),
        vec![Instrument::with_holding("AAPL", dec!(5), dec!(100))],
    );

    let report = session.refresh().await;
    let metrics = report.slots[0].metrics().unwrap();

    assert_eq!(metrics.native_currency, "USD");
    assert_eq!(metrics.display_price, dec!(120));
    assert_eq!(metrics.holding_value, dec!(600));
    assert_eq!(metrics.value_change, dec!(100));
    assert_eq!(report.summary.total_value, dec!(600));
    assert_eq!(provider.calls(), vec!["AAPL", "SEKUSD=X"]);
}

#[tokio::test]
async fn test_empty_cross_rate_excludes_instrument() {
    let provider = MockProvider::new()
        .with_series(series("AAPL", Some("USD"), &[dec!(12)]))
        .with_series(series("ERIC-B.ST", Some("SEK"), &[dec!(60)]));
    let session = session(
        provider,
        vec![
            Instrument::with_holding("AAPL", dec!(5), dec!(100)),
            Instrument::with_holding("ERIC-B.ST", dec!(10), dec!(50)),
        ],
    );

    let report = session.refresh().await;

    assert_eq!(
        report.slots[0].error(),
        Some(&SlotError::CurrencyConversionFailure {
            pair: "SEKUSD=X".to_string()
        })
    );
    // Nothing of the unconverted USD price leaks into the totals.
    assert_eq!(report.summary.total_value, dec!(600));
    assert_eq!(report.summary.total_value_change, dec!(100));
}

#[tokio::test]
async fn test_provider_failure_is_isolated() {
    let provider = MockProvider::new()
        .with_failure("BROKEN")
        .with_series(series("MSFT", Some("SEK"), &[dec!(10)]));
    let session = session(
        provider,
        vec![Instrument::new("BROKEN"), Instrument::with_holding("MSFT", dec!(1), dec!(5))],
    );

    let report = session.refresh().await;

    match &report.slots[0] {
        SlotState::Unavailable(SlotError::Fetch(reason)) => {
            assert!(reason.contains("BROKEN unavailable"));
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert_eq!(report.summary.total_value, dec!(10));
}

#[tokio::test]
async fn test_quote_currency_fills_missing_series_currency() {
    let provider = MockProvider::new()
        .with_series(series("NOVO-B.CO", None, &[dec!(700)]))
        .with_quote_currency("NOVO-B.CO", "DKK")
        .with_series(series("SEKDKK=X", Some("DKK"), &[dec!(0.7)]));
    let session = session(
        provider,
        vec![Instrument::with_holding("NOVO-B.CO", dec!(1), dec!(900))],
    );

    let report = session.refresh().await;
    let metrics = report.slots[0].metrics().unwrap();

    assert_eq!(metrics.native_currency, "DKK");
    assert_eq!(metrics.conversion_rate, Some(dec!(0.7)));
    assert_eq!(metrics.display_price, dec!(1000));
}

#[tokio::test]
async fn test_unknown_currency_assumes_display_currency() {
    let provider = MockProvider::new().with_series(series("^OMX", None, &[dec!(2300)]));
    let session = session(provider.clone(), vec![Instrument::new("^OMX")]);

    let report = session.refresh().await;
    let metrics = report.slots[0].metrics().unwrap();

    assert_eq!(metrics.native_currency, "SEK");
    assert_eq!(metrics.conversion_rate, None);
    assert_eq!(provider.calls(), vec!["^OMX"]);
}

#[tokio::test]
async fn test_unchanged_data_gives_identical_ticks() {
    let provider = MockProvider::new()
        .with_series(series("AAPL", Some("USD"), &[dec!(11), dec!(12)]))
        .with_series(series("SEKUSD=X", Some("USD"), &[dec!(0.1)]))
        .with_series(series("SAAB-B.ST", Some("SEK"), &[dec!(400)]));
    let session = session(
        provider,
        vec![
            Instrument::with_holding("AAPL", dec!(5), dec!(100)),
            Instrument::with_holding("SAAB-B.ST", dec!(2), dec!(300)),
            Instrument::new("EMPTY"),
        ],
    );

    let first = session.refresh().await;
    let second = session.refresh().await;

    assert_eq!((first.sequence, second.sequence), (1, 2));
    assert_eq!(first.slots, second.slots);
    assert_eq!(first.summary, second.summary);
    assert!(second.completed_at >= first.completed_at);
}

#[tokio::test]
async fn test_emptied_series_drops_previous_value() {
    let provider =
        MockProvider::new().with_series(series("SAAB-B.ST", Some("SEK"), &[dec!(400)]));
    let session = session(
        provider.clone(),
        vec![Instrument::with_holding("SAAB-B.ST", dec!(2), dec!(300))],
    );

    let first = session.refresh().await;
    assert_eq!(first.summary.total_value, dec!(800));

    provider.set_series(series("SAAB-B.ST", Some("SEK"), &[]));
    let second = session.refresh().await;

    assert_eq!(second.slots[0].error(), Some(&SlotError::NoDataAvailable));
    assert_eq!(second.summary.total_value, Decimal::ZERO);
    assert_eq!(second.summary.total_value_change, Decimal::ZERO);
}

#[tokio::test]
async fn test_zero_first_close_has_no_percentage() {
    let provider =
        MockProvider::new().with_series(series("PENNY", Some("SEK"), &[Decimal::ZERO, dec!(1)]));
    let session = session(provider, vec![Instrument::new("PENNY")]);

    let report = session.refresh().await;
    let metrics = report.slots[0].metrics().unwrap();

    assert_eq!(metrics.intraday_change, dec!(1));
    assert_eq!(metrics.intraday_change_pct, None);
}
