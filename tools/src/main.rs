//! loyalty-runner: headless front end for the loyalty engine.
//!
//! Usage:
//!   loyalty-runner --db loyalty.db --account alice status
//!   loyalty-runner --db loyalty.db --account alice credit 120 "Order #1042"
//!   loyalty-runner --db loyalty.db --account alice check-in
//!   loyalty-runner --db loyalty.db --account alice spin
//!   loyalty-runner --db loyalty.db --account alice redeem 250 "$5 voucher"
//!   loyalty-runner --db loyalty.db --account alice history
//!   loyalty-runner --db loyalty.db --account alice events
//!   loyalty-runner --db loyalty.db accounts
//!   loyalty-runner --db loyalty.db --account alice --ipc-mode

use anyhow::{bail, Result};
use loyalty_core::{
    clock::SystemClock,
    config::LoyaltyConfig,
    engine::{AccountSummary, LoyaltyEngine},
    service::LoyaltyService,
    store::SqliteStore,
};
use serde_json::json;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const EVENTS_SHOWN: usize = 20;

/// One request per line. `account` overrides the `--account` flag.
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Status {
        #[serde(default)]
        account: Option<String>,
    },
    Credit {
        #[serde(default)]
        account: Option<String>,
        amount: i64,
        reason: String,
    },
    CheckIn {
        #[serde(default)]
        account: Option<String>,
    },
    Spin {
        #[serde(default)]
        account: Option<String>,
    },
    Redeem {
        #[serde(default)]
        account: Option<String>,
        amount: i64,
        reason: String,
    },
    History {
        #[serde(default)]
        account: Option<String>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or("loyalty.db");
    let account = flag_value(&args, "--account").unwrap_or("default");

    let config = match flag_value(&args, "--config") {
        Some(path) => LoyaltyConfig::load(path)?,
        None => LoyaltyConfig::default(),
    };

    let store = Arc::new(SqliteStore::open(db)?);
    store.migrate()?;
    let service = LoyaltyService::new(config, Arc::new(SystemClock), store.clone())?;

    if ipc_mode {
        let stdin = io::stdin();
        return run_ipc_loop(&service, account, stdin.lock(), io::stdout());
    }

    let positional = positional_args(&args);
    let Some((command, rest)) = positional.split_first() else {
        bail!(
            "missing command \
             (status | credit | check-in | spin | redeem | history | events | accounts)"
        );
    };

    match command.as_str() {
        "status" => {
            let summary = service.with_account(account, |e| Ok(e.summary()))?;
            print_summary(&summary);
        }
        "credit" => {
            let (amount, reason) = amount_and_reason(rest)?;
            let balance = service.with_account(account, |e| e.add_points(amount, &reason))?;
            println!("Credited {amount} points ({reason}). Balance: {balance}");
        }
        "check-in" => match service.with_account(account, |e| e.claim_check_in())? {
            Some(reward) => println!(
                "Day {} check-in: +{} points (streak {})",
                reward.day, reward.points, reward.streak
            ),
            None => println!("Already checked in today. Come back tomorrow."),
        },
        "spin" => match service.with_account(account, |e| e.spin())? {
            Some(prize) => println!("You won: {} ({:?})", prize.label, prize.kind),
            None => println!("Already spun today. Come back tomorrow."),
        },
        "redeem" => {
            let (amount, reason) = amount_and_reason(rest)?;
            let code = service.with_account(account, |e| e.redeem_points(amount, &reason))?;
            println!("Redeemed {amount} points. Code: {code}");
        }
        "history" => service.with_account(account, |e| {
            print_history(e);
            Ok(())
        })?,
        "events" => {
            for entry in store.events_for_account(account, EVENTS_SHOWN)? {
                println!(
                    "  {} {:<18} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.event_type,
                    entry.payload
                );
            }
        }
        "accounts" => {
            for id in store.account_ids()? {
                println!("  {id}");
            }
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}

fn run_ipc_loop(
    service: &LoyaltyService,
    default_account: &str,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = input.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(output, "{}", json!({ "error": e.to_string() }))?;
                output.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        // Engine errors are reported per request; the loop keeps going.
        let response = match handle_command(service, default_account, cmd) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("ipc request failed: {e}");
                json!({ "error": e.to_string() })
            }
        };
        writeln!(output, "{response}")?;
        output.flush()?;
    }
    Ok(())
}

fn handle_command(
    service: &LoyaltyService,
    default_account: &str,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let pick = |account: &Option<String>| account.as_deref().unwrap_or(default_account).to_string();
    let value = match cmd {
        IpcCommand::Status { account } => {
            json!(service.with_account(&pick(&account), |e| Ok(e.summary()))?)
        }
        IpcCommand::Credit { account, amount, reason } => {
            let balance =
                service.with_account(&pick(&account), |e| e.add_points(amount, &reason))?;
            json!({ "balance": balance })
        }
        IpcCommand::CheckIn { account } => {
            let reward = service.with_account(&pick(&account), |e| e.claim_check_in())?;
            json!({ "reward": reward })
        }
        IpcCommand::Spin { account } => {
            let prize = service.with_account(&pick(&account), |e| e.spin())?;
            json!({ "prize": prize })
        }
        IpcCommand::Redeem { account, amount, reason } => {
            let code =
                service.with_account(&pick(&account), |e| e.redeem_points(amount, &reason))?;
            json!({ "code": code })
        }
        IpcCommand::History { account } => service.with_account(&pick(&account), |e| {
            Ok(json!({
                "history": e.history(),
                "redemptions": e.redemptions(),
            }))
        })?,
        IpcCommand::Quit => json!({}),
    };
    Ok(value)
}

fn print_summary(s: &AccountSummary) {
    println!("=== ACCOUNT {} ===", s.account_id);
    println!("  balance:        {}", s.balance);
    println!("  tier:           {}", s.tier);
    match (s.next_tier, s.points_to_next_tier) {
        (Some(next), Some(gap)) => {
            println!("  next tier:      {next} ({gap} to go, {}%)", s.progress_percent)
        }
        _ => println!("  next tier:      (top tier reached)"),
    }
    println!("  streak:         {}", s.check_in_streak);
    println!(
        "  check-in:       {}",
        if s.can_check_in {
            format!("available (+{})", s.next_check_in_reward)
        } else {
            "claimed today".to_string()
        }
    );
    println!("  spin:           {}", if s.can_spin { "available" } else { "used today" });
    println!("  redemptions:    {}", s.redemption_count);
}

fn print_history(engine: &LoyaltyEngine) {
    println!("=== HISTORY ({} entries) ===", engine.history().len());
    for entry in engine.history() {
        println!(
            "  #{:<4} {} {:>+6}  {}",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.amount,
            entry.reason
        );
    }
    if !engine.redemptions().is_empty() {
        println!();
        println!("=== REDEMPTIONS ===");
        for r in engine.redemptions() {
            println!("  {} {:>6}  {}", r.timestamp.format("%Y-%m-%d %H:%M"), r.amount, r.code);
        }
    }
}

fn amount_and_reason(rest: &[String]) -> Result<(i64, String)> {
    let Some(amount) = rest.first() else {
        bail!("missing amount");
    };
    let amount: i64 = amount.parse()?;
    let reason = if rest.len() > 1 {
        rest[1..].join(" ")
    } else {
        "Manual adjustment".to_string()
    };
    Ok((amount, reason))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<String> {
    const VALUED: [&str; 3] = ["--db", "--account", "--config"];
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUED.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn service() -> LoyaltyService {
        let store = SqliteStore::in_memory().expect("in-memory store");
        store.migrate().expect("migration");
        LoyaltyService::new(LoyaltyConfig::default_test(), Arc::new(SystemClock), Arc::new(store))
            .expect("service")
    }

    fn run(service: &LoyaltyService, default_account: &str, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        run_ipc_loop(service, default_account, input.as_bytes(), &mut out).expect("ipc loop");
        String::from_utf8(out)
            .expect("utf-8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json response"))
            .collect()
    }

    #[test]
    fn requests_without_account_use_the_flag_account() {
        let service = service();
        let responses = run(
            &service,
            "a",
            "{\"type\":\"credit\",\"amount\":10,\"reason\":\"x\"}\n{\"type\":\"status\"}\n",
        );

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["balance"], 10);
        assert_eq!(responses[1]["account_id"], "a");
        assert_eq!(responses[1]["balance"], 10);
    }

    #[test]
    fn explicit_account_overrides_the_flag() {
        let service = service();
        let responses = run(
            &service,
            "a",
            "{\"type\":\"credit\",\"account\":\"b\",\"amount\":7,\"reason\":\"Review\"}\n",
        );

        assert_eq!(responses[0]["balance"], 7);
        assert_eq!(service.with_account("a", |e| Ok(e.balance())).unwrap(), 0);
        assert_eq!(service.with_account("b", |e| Ok(e.balance())).unwrap(), 7);
    }

    #[test]
    fn bad_lines_are_reported_and_quit_stops_the_loop() {
        let service = service();
        let input = "not json\n\
                     {\"type\":\"redeem\",\"amount\":-5,\"reason\":\"x\"}\n\
                     {\"type\":\"check_in\"}\n\
                     {\"type\":\"quit\"}\n\
                     {\"type\":\"credit\",\"amount\":10,\"reason\":\"late\"}\n";
        let responses = run(&service, "a", input);

        assert_eq!(responses.len(), 3);
        assert!(responses[0]["error"].is_string());
        assert!(responses[1]["error"].is_string(), "negative amounts are rejected");
        assert_eq!(responses[2]["reward"]["points"], 50);
        assert_eq!(service.with_account("a", |e| Ok(e.balance())).unwrap(), 50);
    }
}
