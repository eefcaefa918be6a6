use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use personal_ledger::contact::ContactForm;
use personal_ledger::ledger::{SortOrder, TransactionFilter};
use personal_ledger::money::parse_amount;
use personal_ledger::session::Session;
use personal_ledger::storage::FileStorage;
use personal_ledger::{Policy, Transaction};
use rust_decimal::Decimal;
use std::{fs, io, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory that holds the ledger data.
    #[arg(long, env = "LEDGER_DATA_DIR", default_value = ".", value_hint = ValueHint::DirPath)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current balance and today's limit usage.
    Balance,

    /// Deposit money into the account.
    Deposit {
        #[arg(allow_negative_numbers = true)]
        amount: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Withdraw money from the account.
    Withdraw {
        #[arg(allow_negative_numbers = true)]
        amount: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List transactions.
    History {
        #[arg(long = "type", value_enum, default_value_t = KindArg::All)]
        kind: KindArg,

        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
    },

    /// Show statistics for the current month and the whole history.
    Stats,

    /// Export transactions as CSV.
    Export {
        /// Output file, stdout if omitted.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Replace all data with a previously saved JSON document.
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Reset all data to the demo defaults.
    Reset,

    /// Clear the transaction history, keeping the demo transactions.
    ClearHistory,

    /// Delete all contact messages.
    ClearMessages,

    /// Leave a contact message.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,
    },

    /// List contact messages.
    Messages,

    /// Show or change the account limits.
    Settings {
        #[arg(long)]
        daily_deposit_limit: Option<Decimal>,

        #[arg(long)]
        daily_withdrawal_limit: Option<Decimal>,

        #[arg(long)]
        min_balance: Option<Decimal>,

        #[arg(long)]
        max_deposit_per_transaction: Option<Decimal>,

        /// Inactivity timeout in seconds.
        #[arg(long)]
        session_timeout: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    All,
    Deposit,
    Withdraw,
}

impl From<KindArg> for TransactionFilter {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::All => TransactionFilter::All,
            KindArg::Deposit => TransactionFilter::Deposits,
            KindArg::Withdraw => TransactionFilter::Withdrawals,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Newest,
    Oldest,
    AmountHigh,
    AmountLow,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => SortOrder::Newest,
            SortArg::Oldest => SortOrder::Oldest,
            SortArg::AmountHigh => SortOrder::AmountHigh,
            SortArg::AmountLow => SortOrder::AmountLow,
        }
    }
}

fn print_transaction(transaction: &Transaction) {
    let sign = if transaction.is_deposit() { '+' } else { '-' };
    println!(
        "{}  {:<30} {:>8}  {}${:.2}  balance ${:.2}",
        transaction.date().with_timezone(&chrono::Local).format("%b %-d, %Y %H:%M"),
        transaction.description(),
        transaction.kind(),
        sign,
        transaction.amount(),
        transaction.balance_after(),
    );
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut session = Session::open(FileStorage::new(&cli.data_dir));

    match cli.command {
        Command::Balance => {
            let usage = session.daily_usage();
            println!("Balance: ${:.2}", session.balance());
            println!(
                "Deposited today: ${:.2} ({}% of limit, ${:.2} left)",
                usage.deposited, usage.deposit_usage, usage.deposit_headroom,
            );
            println!(
                "Withdrawn today: ${:.2} ({}% of limit, ${:.2} left)",
                usage.withdrawn, usage.withdrawal_usage, usage.withdrawal_headroom,
            );
            println!("Maximum withdrawal: ${:.2}", usage.max_withdrawal);
        }
        Command::Deposit { amount, description } => {
            let transaction = session
                .deposit(parse_amount(&amount), description.as_deref())
                .context("deposit failed")?;
            println!("Successfully deposited ${:.2}", transaction.amount());
        }
        Command::Withdraw { amount, description } => {
            let transaction = session
                .withdraw(parse_amount(&amount), description.as_deref())
                .context("withdrawal failed")?;
            println!("Successfully withdrew ${:.2}", transaction.amount());
        }
        Command::History { kind, sort } => {
            let transactions = session.list(kind.into(), sort.into());
            if transactions.is_empty() {
                println!("No transactions found.");
            }
            transactions.into_iter().for_each(print_transaction);
        }
        Command::Stats => {
            let monthly = session.monthly_stats();
            let summary = session.summary();
            println!("Transactions: {}", session.ledger().total_transactions());
            println!("This month:");
            println!("  deposits     ${:.2} ({})", monthly.total_deposits, monthly.deposit_count);
            println!("  withdrawals  ${:.2} ({})", monthly.total_withdrawals, monthly.withdrawal_count);
            println!("  net          ${:.2}", monthly.net);
            println!("  average      ${:.2}", monthly.average_amount);
            println!("  largest      ${:.2}", monthly.largest_amount);
            println!("All time:");
            println!("  deposits     ${:.2}", summary.total_deposits);
            println!("  withdrawals  ${:.2}", summary.total_withdrawals);
            println!("  net          ${:.2}", summary.net);
        }
        Command::Export { output } => match output {
            Some(path) => {
                let file = fs::File::create(&path).context("unable to create output file")?;
                session.export_csv(file).context("exporting transactions failed")?;
            }
            None => session.export_csv(io::stdout()).context("exporting transactions failed")?,
        },
        Command::Import { path } => {
            let raw = fs::read_to_string(&path).context("unable to read import file")?;
            session.import(&raw).context("importing data failed")?;
            println!("Imported {} transactions", session.transactions().len());
        }
        Command::Reset => {
            session.reset_to_demo();
            println!("All data has been reset to defaults");
        }
        Command::ClearHistory => {
            session.clear_history();
            println!("Transaction history cleared (demo data kept)");
        }
        Command::ClearMessages => {
            session.clear_messages();
            println!("Contact messages cleared");
        }
        Command::Contact { name, email, subject, message } => {
            let form = ContactForm { name, email, subject, message };
            session.submit_message(form).context("sending message failed")?;
            println!("Your message has been recorded");
        }
        Command::Messages => {
            for message in session.contact_messages() {
                println!(
                    "{}  {} <{}>  [{}]\n  {}",
                    message.date.with_timezone(&chrono::Local).format("%b %-d, %Y %H:%M"),
                    message.name,
                    message.email,
                    message.subject,
                    message.message,
                );
            }
        }
        Command::Settings {
            daily_deposit_limit,
            daily_withdrawal_limit,
            min_balance,
            max_deposit_per_transaction,
            session_timeout,
        } => {
            let current = session.ledger().policy().clone();
            let policy = Policy {
                daily_deposit_limit: daily_deposit_limit.unwrap_or(current.daily_deposit_limit),
                daily_withdrawal_limit: daily_withdrawal_limit.unwrap_or(current.daily_withdrawal_limit),
                min_balance: min_balance.unwrap_or(current.min_balance),
                max_deposit_per_transaction: max_deposit_per_transaction
                    .unwrap_or(current.max_deposit_per_transaction),
                session_timeout: session_timeout.unwrap_or(current.session_timeout),
            };
            if policy != current {
                session.set_policy(policy).context("updating settings failed")?;
            }
            let policy = session.ledger().policy();
            println!("Daily deposit limit:         ${:.2}", policy.daily_deposit_limit);
            println!("Daily withdrawal limit:      ${:.2}", policy.daily_withdrawal_limit);
            println!("Minimum balance:             ${:.2}", policy.min_balance);
            println!("Maximum deposit per payment: ${:.2}", policy.max_deposit_per_transaction);
            println!("Session timeout:             {}s", policy.session_timeout);
        }
    }
    Ok(())
}
