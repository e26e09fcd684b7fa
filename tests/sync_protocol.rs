mod common;

use anyhow::Result;

use wallboard::client::{CycleOutcome, FetchOutcome, FetchUpdates, Poller, UpdateFetcher};
use wallboard::config::SectionConfig;
use wallboard::patch::Reconciler;
use wallboard::surface::PanelGrid;

fn weather_grid() -> PanelGrid {
    let sections: Vec<SectionConfig> = serde_json::from_value(serde_json::json!([
        { "id": "weather", "type": "weather", "region": "top-left" }
    ]))
    .unwrap();
    PanelGrid::from_config(&sections)
}

#[test]
fn conditional_fetch_round_trip() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({
        "weather": { "data": { "temp": 21 } }
    }))?;
    let fetcher = UpdateFetcher::new(&server.base_url)?;

    // First poll carries no token and always gets the full envelope.
    let FetchOutcome::Updated(envelope) = fetcher.fetch_updates("")? else {
        panic!("expected an update on the first poll");
    };
    assert!(!envelope.hash.is_empty());
    assert!(envelope.updates.contains_key("weather"));

    // Token round-trips into a 304 while nothing changed.
    assert!(matches!(
        fetcher.fetch_updates(&envelope.hash)?,
        FetchOutcome::NotModified
    ));

    // A state change flips the hash and re-delivers.
    server.write_state(&serde_json::json!({
        "weather": { "data": { "temp": 22 } }
    }))?;
    let FetchOutcome::Updated(second) = fetcher.fetch_updates(&envelope.hash)? else {
        panic!("expected an update after the state change");
    };
    assert_ne!(second.hash, envelope.hash);

    Ok(())
}

#[test]
fn poll_cycle_applies_flashes_and_suppresses() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({
        "weather": { "data": { "temp": 21 } }
    }))?;

    let mut grid = weather_grid();
    let mut reconciler = Reconciler::new(Default::default());
    let mut poller = Poller::new(UpdateFetcher::new(&server.base_url)?);

    let outcome = poller.cycle(&mut |updates| {
        reconciler.reconcile(&mut grid, updates);
        Ok(())
    });
    let CycleOutcome::Applied { token: first_token } = outcome else {
        panic!("expected the first cycle to apply");
    };
    assert_eq!(poller.token(), first_token);

    let temp = grid.target("weather", "temp").unwrap();
    assert_eq!(temp.text(), Some("21°"));
    let first_flash = temp.flashed_at().unwrap();

    // Unchanged state pipes straight through as NotModified.
    let outcome = poller.cycle(&mut |updates| {
        reconciler.reconcile(&mut grid, updates);
        Ok(())
    });
    assert_eq!(outcome, CycleOutcome::NotModified);
    assert_eq!(poller.token(), first_token);

    // Same temp under a new hash: token advances, no reflash.
    server.write_state(&serde_json::json!({
        "weather": { "data": { "temp": 21 } },
        "ticker": { "data": { "v": 1 } }
    }))?;
    let outcome = poller.cycle(&mut |updates| {
        reconciler.reconcile(&mut grid, updates);
        Ok(())
    });
    let CycleOutcome::Applied { token: second_token } = outcome else {
        panic!("expected the hash change to re-deliver");
    };
    assert_ne!(second_token, first_token);
    assert_eq!(
        grid.target("weather", "temp").unwrap().flashed_at(),
        Some(first_flash)
    );

    // A real value change rewrites and reflashes.
    server.write_state(&serde_json::json!({
        "weather": { "data": { "temp": 22 } }
    }))?;
    poller.cycle(&mut |updates| {
        reconciler.reconcile(&mut grid, updates);
        Ok(())
    });
    let temp = grid.target("weather", "temp").unwrap();
    assert_eq!(temp.text(), Some("22°"));
    assert!(temp.flashed_at().unwrap() > first_flash);

    Ok(())
}

#[test]
fn malformed_state_drives_backoff_not_token_loss() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({
        "weather": { "data": { "temp": 21 } }
    }))?;

    let mut poller = Poller::new(UpdateFetcher::new(&server.base_url)?);
    let CycleOutcome::Applied { token } = poller.cycle(&mut |_| Ok(())) else {
        panic!("expected the first cycle to apply");
    };

    // The server now fails to render an envelope; the client backs off and
    // keeps its token.
    std::fs::write(&server.state_file, b"{ not json").unwrap();
    let outcome = poller.cycle(&mut |_| Ok(()));
    let CycleOutcome::Failed { delay } = outcome else {
        panic!("expected a failed cycle");
    };
    assert_eq!(delay, std::time::Duration::from_millis(1000));
    assert_eq!(poller.token(), token);

    let outcome = poller.cycle(&mut |_| Ok(()));
    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            delay: std::time::Duration::from_millis(2000)
        }
    );

    // Recovery resets the ladder and resumes 304s on the kept token.
    server.write_state(&serde_json::json!({
        "weather": { "data": { "temp": 21 } }
    }))?;
    assert_eq!(poller.cycle(&mut |_| Ok(())), CycleOutcome::NotModified);

    Ok(())
}
