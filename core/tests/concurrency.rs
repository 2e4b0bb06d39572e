//! Concurrency tests — per-account serialisation through LoyaltyService.

use chrono::{TimeZone, Utc};
use loyalty_core::{
    clock::ManualClock,
    config::LoyaltyConfig,
    error::LoyaltyResult,
    event::LoyaltyEvent,
    service::LoyaltyService,
    state::AccountState,
    store::{SqliteStore, StateStore},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn service() -> LoyaltyService {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 12, 24, 8, 0, 0).unwrap(),
    ));
    let store = SqliteStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    LoyaltyService::new(LoyaltyConfig::default_test(), clock, Arc::new(store))
        .expect("service")
}

/// Holds loads of `slow_account` until `release` fires or five seconds pass.
struct StallingStore {
    inner: SqliteStore,
    slow_account: &'static str,
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    timed_out: AtomicBool,
}

impl StateStore for StallingStore {
    fn load(&self, account_id: &str) -> LoyaltyResult<Option<AccountState>> {
        if account_id == self.slow_account {
            let _ = self.started.lock().unwrap().send(());
            let waited = self.release.lock().unwrap().recv_timeout(Duration::from_secs(5));
            if waited.is_err() {
                self.timed_out.store(true, Ordering::SeqCst);
            }
        }
        self.inner.load(account_id)
    }

    fn save(
        &self,
        account_id: &str,
        state: &AccountState,
        events: &[LoyaltyEvent],
        at: chrono::DateTime<Utc>,
    ) -> LoyaltyResult<()> {
        self.inner.save(account_id, state, events, at)
    }
}

#[test]
fn racing_claims_grant_exactly_one_reward() {
    let service = service();

    let granted: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| service.with_account("shared", |e| e.claim_check_in())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("claim"))
            .filter(Option::is_some)
            .count()
    });

    assert_eq!(granted, 1, "the daily gate must hold under contention");
    let balance = service.with_account("shared", |e| Ok(e.balance())).unwrap();
    assert_eq!(balance, 50);
}

#[test]
fn racing_spins_grant_exactly_one_prize() {
    let service = service();

    let granted: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| service.with_account("wheel", |e| e.spin())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("spin"))
            .filter(Option::is_some)
            .count()
    });

    assert_eq!(granted, 1);
}

#[test]
fn concurrent_credits_are_not_lost() {
    let service = service();

    thread::scope(|s| {
        for t in 0..4 {
            let service = &service;
            s.spawn(move || {
                for i in 0..25 {
                    service
                        .with_account("busy", |e| e.add_points(2, &format!("t{t}-{i}")))
                        .expect("credit");
                }
            });
        }
    });

    let (balance, history) = service
        .with_account("busy", |e| Ok((e.balance(), e.history().len())))
        .unwrap();
    assert_eq!(balance, 200);
    assert_eq!(history, 50);
}

#[test]
fn accounts_are_independent() {
    let service = service();

    let a = service.with_account("alice", |e| e.claim_check_in()).unwrap();
    let b = service.with_account("bob", |e| e.claim_check_in()).unwrap();

    assert!(a.is_some());
    assert!(b.is_some(), "one account's claim must not gate another's");
    assert_eq!(service.loaded_accounts(), vec!["alice".to_string(), "bob".to_string()]);
}

#[test]
fn service_hands_out_the_same_engine() {
    let service = service();
    let first = service.account("carol").unwrap();
    let second = service.account("carol").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn slow_first_load_does_not_block_other_accounts() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 12, 24, 8, 0, 0).unwrap(),
    ));
    let inner = SqliteStore::in_memory().expect("in-memory store");
    inner.migrate().expect("migration");
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let store = Arc::new(StallingStore {
        inner,
        slow_account: "slow",
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
        timed_out: AtomicBool::new(false),
    });
    let service = LoyaltyService::new(LoyaltyConfig::default_test(), clock, store.clone())
        .expect("service");

    thread::scope(|s| {
        let slow = s.spawn(|| service.with_account("slow", |e| Ok(e.balance())));
        started_rx.recv().expect("slow load started");

        service
            .with_account("fast", |e| e.add_points(5, "Review"))
            .expect("fast account");
        assert!(
            !store.timed_out.load(Ordering::SeqCst),
            "fast account waited for the slow account's load"
        );

        release_tx.send(()).expect("release slow load");
        assert_eq!(slow.join().expect("thread panicked").expect("slow account"), 0);
    });
}
