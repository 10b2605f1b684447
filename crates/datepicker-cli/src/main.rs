mod text;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use datepicker_core::calendar::{build_month_grid, month_start, WeekStart};
use datepicker_core::disabled::{DateInput, DisabledConfig, DisabledPolicy};
use datepicker_core::format::{require_iso, OutputFormat};
use datepicker_core::host::{Clock, FieldSlot, ManualClock, RecordingHost, SystemClock};
use datepicker_core::options::PickerOptions;
use datepicker_core::widget::{Binding, DatePicker, PanelAction, ValOutput};

/// Milliseconds between replayed clicks; longer than the reopen guard.
const CLICK_INTERVAL_MS: i64 = 1_000;

#[derive(Parser)]
#[command(name = "datepicker", version, about = "Calendar date picker in the terminal")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the calendar grid for a month
    Grid {
        /// Year, e.g. 2024
        #[arg(allow_hyphen_values = true)]
        year: i32,
        /// Month, 1-12 (0 and 13 roll into the neighboring year)
        #[arg(allow_hyphen_values = true)]
        month: i32,
        /// Start weeks on Sunday instead of Monday
        #[arg(long)]
        sunday: bool,
        #[arg(long, default_value = "en-US")]
        locale: String,
        /// Emit the raw 42-cell grid as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay day clicks through a picker and print its outputs
    Pick(PickArgs),
    /// Report whether dates are disabled under a policy
    Check {
        /// Dates to test (YYYY-MM-DD)
        #[arg(required = true, value_parser = parse_date_arg)]
        dates: Vec<NaiveDate>,
        /// Options file whose `disabled` block is the starting policy
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args)]
struct PickArgs {
    /// Clicked days in order (YYYY-MM-DD)
    #[arg(value_parser = parse_date_arg)]
    clicks: Vec<NaiveDate>,

    /// Options file (JSON, camelCase keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Select a range instead of a single date
    #[arg(long)]
    range: bool,

    #[arg(long)]
    locale: Option<String>,

    /// Output format of the direct field
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Month panels side by side
    #[arg(long)]
    months: Option<i32>,

    #[arg(long)]
    sunday: bool,

    /// How the picker is bound
    #[arg(long, value_enum, default_value_t = BindingArg::Container)]
    binding: BindingArg,

    /// Pretend today is this date
    #[arg(long, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,

    #[command(flatten)]
    policy: PolicyArgs,

    /// Print the final panel
    #[arg(long)]
    show: bool,

    /// Emit the outputs as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PolicyArgs {
    /// Disable this day and everything before it
    #[arg(long)]
    before: Option<String>,
    /// Disable this day and everything after it
    #[arg(long)]
    after: Option<String>,
    /// First selectable day
    #[arg(long)]
    min: Option<String>,
    /// Last selectable day
    #[arg(long)]
    max: Option<String>,
    /// Disable a specific day (repeatable)
    #[arg(long = "exclude")]
    excluded: Vec<String>,
}

impl PolicyArgs {
    fn is_empty(&self) -> bool {
        self.before.is_none()
            && self.after.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.excluded.is_empty()
    }

    /// Layer the flags over `base`; flags win, exclusions accumulate.
    fn overlay(&self, base: Option<DisabledConfig>) -> Option<DisabledConfig> {
        if self.is_empty() {
            return base;
        }
        let text = |s: &Option<String>| s.as_deref().map(DateInput::from);
        let mut config = base.unwrap_or_default();
        config.before = text(&self.before).or(config.before);
        config.after = text(&self.after).or(config.after);
        config.min = text(&self.min).or(config.min);
        config.max = text(&self.max).or(config.max);
        config
            .dates
            .extend(self.excluded.iter().map(|s| DateInput::from(s.as_str())));
        Some(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Locale,
    Iso,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BindingArg {
    /// One editable field holding the formatted text
    Direct,
    /// Hidden ISO fields plus a display element
    Container,
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    require_iso(s).map_err(|e| format!("{e} (expected YYYY-MM-DD)"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Grid {
            year,
            month,
            sunday,
            locale,
            json,
        } => cmd_grid(year, month, sunday, locale, json),
        Commands::Pick(args) => cmd_pick(args),
        Commands::Check {
            dates,
            config,
            policy,
        } => cmd_check(&dates, config, &policy),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn load_options(path: Option<&PathBuf>) -> Result<PickerOptions> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            PickerOptions::from_json(&json)
                .with_context(|| format!("Invalid options in {}", path.display()))
        }
        None => Ok(PickerOptions::default()),
    }
}

fn cmd_grid(year: i32, month: i32, sunday: bool, locale: String, json: bool) -> Result<()> {
    let Some(anchor) = month_start(year, month) else {
        bail!("{year}-{month} is outside the supported calendar");
    };

    if json {
        let grid = build_month_grid(year, month, WeekStart::from_sunday_flag(sunday));
        println!(
            "{}",
            serde_json::to_string_pretty(&grid.to_vec()).context("Failed to serialize grid")?
        );
        return Ok(());
    }

    let options = PickerOptions {
        locale,
        start_on_sunday: sunday,
        ..Default::default()
    };
    let mut picker = DatePicker::new(options, Binding::DirectField, RecordingHost::new());
    picker.set_view_month(anchor);
    print!("{}", text::render_panel(&picker.panel()));
    Ok(())
}

fn cmd_pick(args: PickArgs) -> Result<()> {
    let mut options = load_options(args.config.as_ref())?;
    options.range |= args.range;
    options.start_on_sunday |= args.sunday;
    if let Some(locale) = args.locale {
        options.locale = locale;
    }
    if let Some(format) = args.format {
        options.format = match format {
            FormatArg::Locale => OutputFormat::Locale,
            FormatArg::Iso => OutputFormat::Iso,
        };
    }
    if let Some(months) = args.months {
        options.months = months;
    }
    options.disabled = args.policy.overlay(options.disabled.take());

    let binding = match args.binding {
        BindingArg::Direct => Binding::DirectField,
        BindingArg::Container => Binding::Container {
            fields: if options.range { 2 } else { 1 },
        },
    };
    let today = args.today.unwrap_or_else(|| SystemClock.today());
    let clock = ManualClock::new(today);
    let host = RecordingHost::new();
    let mut picker = DatePicker::with_clock(options, binding, host.clone(), clock.clone());

    let mut skipped = Vec::new();
    for day in args.clicks {
        if picker.is_disabled(day) {
            log::warn!("{day} is disabled; click ignored");
            skipped.push(day);
        }
        picker.anchor_clicked();
        picker.set_view_month(day);
        picker.handle_action(PanelAction::Pick(day));
        clock.advance(CLICK_INTERVAL_MS);
    }

    let fields: Vec<(&str, String)> = [
        ("field", FieldSlot::Direct),
        ("start", FieldSlot::Start),
        ("end", FieldSlot::End),
    ]
    .into_iter()
    .filter_map(|(name, slot)| host.field_value(slot).map(|v| (name, v)))
    .collect();
    let display = host.display_text();
    let value: Vec<String> = match picker.val() {
        ValOutput::Single(v) => vec![v],
        ValOutput::Range(a, b) => vec![a, b],
    };

    if args.json {
        let mut out = serde_json::Map::new();
        out.insert("mode".into(), picker.mode().to_string().into());
        out.insert("value".into(), value.into());
        if let Some(display) = display {
            out.insert("display".into(), display.into());
        }
        for (name, v) in &fields {
            out.insert((*name).into(), v.clone().into());
        }
        out.insert("open".into(), picker.is_open().into());
        out.insert(
            "skipped".into(),
            skipped.iter().map(|d| d.to_string()).collect::<Vec<_>>().into(),
        );
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialize outputs")?
        );
    } else {
        println!("mode:    {}", picker.mode());
        println!("value:   {}", value.join(", "));
        if let Some(display) = display {
            println!("display: {display}");
        }
        for (name, v) in &fields {
            println!("{:<8} {v}", format!("{name}:"));
        }
        for day in &skipped {
            println!("skipped: {day} (disabled)");
        }
    }

    if args.show {
        println!();
        print!("{}", text::render_panel(&picker.panel()));
    }
    Ok(())
}

fn cmd_check(dates: &[NaiveDate], config: Option<PathBuf>, policy: &PolicyArgs) -> Result<()> {
    let options = load_options(config.as_ref())?;
    let config = policy.overlay(options.disabled).unwrap_or_default();
    let policy = DisabledPolicy::normalize(&config);
    for date in dates {
        let verdict = if policy.is_disabled(*date) {
            "disabled"
        } else {
            "enabled"
        };
        println!("{date} {verdict}");
    }
    Ok(())
}
