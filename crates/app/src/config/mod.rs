use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use engine::{
    Competence, EntryDraft, EntryId, Installment, Kind, Modality, MoneyCents, Owner, PendingScope,
    PeriodFilter, ResultEngine,
};
use serde::{Deserialize, Deserializer};

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/finance.toml";
const DEFAULT_STATE_PATH: &str = "config/finance_state.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub anon_key: String,
    pub table: String,
    /// Owner to act on; when unset the last active owner is used.
    #[serde(deserialize_with = "owner_from_str")]
    pub owner: Option<Owner>,
    pub level: String,
    pub state_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            anon_key: String::new(),
            table: client::DEFAULT_TABLE.to_string(),
            owner: None,
            level: "info".to_string(),
            state_path: DEFAULT_STATE_PATH.to_string(),
        }
    }
}

// Owners are accepted in any case, like on the command line.
fn owner_from_str<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Owner>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|raw| raw.parse().map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Debug, Parser)]
#[command(
    name = "finance",
    about = "Household income and expense tracker",
    disable_version_flag = true
)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the store base URL (e.g. https://<project>.supabase.co).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the public API key.
    #[arg(long, global = true)]
    anon_key: Option<String>,
    /// Override the entries table.
    #[arg(long, global = true)]
    table: Option<String>,
    /// Act on this owner for this invocation.
    #[arg(long, global = true)]
    owner: Option<Owner>,
    /// Override the log level (e.g. info, debug).
    #[arg(long, global = true)]
    level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in. The password is read from FINANCE_PASSWORD or the first line
    /// of stdin, never from the command line.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account (password read like `login`).
    Signup {
        #[arg(long)]
        email: String,
    },
    Logout,
    /// Show the active owner, or switch to another one.
    Owner {
        #[arg(value_name = "OWNER")]
        switch_to: Option<Owner>,
    },
    /// List the entries of a period.
    List {
        #[command(flatten)]
        period: PeriodArgs,
        /// Only entries whose name, location or description contains this.
        #[arg(long)]
        search: Option<String>,
    },
    /// Balances and totals, all-time and for a period.
    Summary {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Totals by modality, status and name for a period.
    Report {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        search: Option<String>,
    },
    /// Record an income or an expense (or a whole installment plan).
    Add(EntryArgs),
    /// Change fields of an existing entry.
    Edit {
        id: EntryId,
        #[command(flatten)]
        changes: EntryChanges,
    },
    Delete {
        id: EntryId,
    },
    /// Pending entries of one kind and their total.
    Pending {
        #[arg(value_enum, default_value_t = ScopeArg::Expenses)]
        scope: ScopeArg,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Settle pending entries in a single request.
    Settle {
        #[arg(value_enum)]
        scope: ScopeArg,
        /// Entries to settle.
        ids: Vec<EntryId>,
        /// Settle every pending entry of the scope.
        #[arg(long)]
        all_visible: bool,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Months available for navigation around a reference month.
    Months {
        #[arg(long)]
        around: Option<Competence>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Pending incomes of all time.
    Incomes,
    /// Pending expenses of the period.
    Expenses,
}

impl From<ScopeArg> for PendingScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Incomes => PendingScope::Incomes,
            ScopeArg::Expenses => PendingScope::Expenses,
        }
    }
}

/// Period selection shared by the reading commands. Defaults to the current
/// month.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct PeriodArgs {
    /// A single month, as YYYY/MM.
    #[arg(long, conflicts_with_all = ["from", "to", "all"])]
    month: Option<Competence>,
    /// First month of a range (inclusive).
    #[arg(long, requires = "to", conflicts_with = "all")]
    from: Option<Competence>,
    /// Last month of a range (inclusive).
    #[arg(long, requires = "from", conflicts_with = "all")]
    to: Option<Competence>,
    /// Every entry regardless of month.
    #[arg(long)]
    all: bool,
    /// Move the period by this many months (negative goes back).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    shift: i32,
}

impl PeriodArgs {
    pub fn resolve(&self, today: NaiveDate) -> ResultEngine<PeriodFilter> {
        let base = if self.all {
            PeriodFilter::All
        } else if let (Some(start), Some(end)) = (self.from, self.to) {
            PeriodFilter::Range { start, end }
        } else {
            PeriodFilter::Month(self.month.unwrap_or_else(|| Competence::from_date(today)))
        };
        base.shift(self.shift)
    }
}

fn parse_installment(raw: &str) -> std::result::Result<Installment, String> {
    let (index, count) = raw
        .split_once('/')
        .ok_or_else(|| format!("expected I/N, got {raw:?}"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid installment index {index:?}"))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid installment count {count:?}"))?;
    Ok(Installment::new(index, count))
}

#[derive(Debug, Clone, ClapArgs)]
pub struct EntryArgs {
    /// income or expense
    #[arg(long)]
    kind: Kind,
    #[arg(long)]
    name: String,
    /// Amount in reais; `,` or `.` as decimal separator.
    #[arg(long, allow_hyphen_values = true)]
    amount: MoneyCents,
    /// YYYY-MM-DD; defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    settled: bool,
    /// credit, debit or loan
    #[arg(long, default_value_t = Modality::Debit)]
    modality: Modality,
    #[arg(long)]
    recurring: bool,
    /// Position in an installment plan as I/N; creates entries I..=N.
    #[arg(long, value_parser = parse_installment)]
    installment: Option<Installment>,
}

impl EntryArgs {
    pub fn into_draft(self, owner: Owner, today: NaiveDate) -> EntryDraft {
        let mut draft = EntryDraft::new(
            owner,
            self.kind,
            self.name,
            self.amount,
            self.date.unwrap_or(today),
        );
        draft.location = self.location;
        draft.description = self.description;
        draft.settled = self.settled;
        draft.modality = self.modality;
        draft.recurring = self.recurring;
        draft.installment = self.installment;
        draft
    }
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct EntryChanges {
    #[arg(long)]
    kind: Option<Kind>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<MoneyCents>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    settled: Option<bool>,
    #[arg(long)]
    modality: Option<Modality>,
    #[arg(long)]
    recurring: Option<bool>,
    #[arg(long, value_parser = parse_installment, conflicts_with = "no_installment")]
    installment: Option<Installment>,
    /// Detach the entry from its installment plan.
    #[arg(long)]
    no_installment: bool,
}

impl EntryChanges {
    pub fn apply(self, draft: &mut EntryDraft) {
        if let Some(kind) = self.kind {
            draft.kind = kind;
        }
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(settled) = self.settled {
            draft.settled = settled;
        }
        if let Some(modality) = self.modality {
            draft.modality = modality;
        }
        if let Some(recurring) = self.recurring {
            draft.recurring = recurring;
        }
        if self.no_installment {
            draft.installment = None;
        } else if let Some(installment) = self.installment {
            draft.installment = Some(installment);
        }
    }
}

/// Parses the command line and layers file, environment and flags.
pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();
    let settings = settings(&args)?;
    Ok((settings, args.command))
}

pub fn settings(args: &Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINANCE"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(anon_key) = &args.anon_key {
        settings.anon_key = anon_key.clone();
    }
    if let Some(table) = &args.table {
        settings.table = table.clone();
    }
    if let Some(owner) = args.owner {
        settings.owner = Some(owner);
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
