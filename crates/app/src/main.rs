use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use questionnaire_core::model::{CourseModuleId, UserId};
use questionnaire_core::{Clock, ConditionalNavigation, NavigationPolicy, SequentialNavigation};
use services::{
    ActivityPageController, HtmlRenderer, MobileArgs, MobileOutputService, RoleAccessPolicy,
    UserIdentity,
};
use storage::{Fixture, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Navigation {
    /// Skip pages whose questions are all hidden by dependencies
    Conditional,
    /// Always move one page at a time
    Sequential,
}

impl Navigation {
    fn policy(self) -> Arc<dyn NavigationPolicy> {
        match self {
            Navigation::Conditional => Arc::new(ConditionalNavigation),
            Navigation::Sequential => Arc::new(SequentialNavigation),
        }
    }
}

/// Render the mobile view of a questionnaire activity from a JSON fixture.
#[derive(Parser, Debug)]
#[command(name = "questionnaire-mobile", version, about)]
struct Args {
    /// Fixture with activities, responses, and capability grants
    #[arg(long, env = "QUESTIONNAIRE_FIXTURE", value_name = "path")]
    fixture: PathBuf,

    /// Calling user; omit to call as a guest
    #[arg(long, env = "QUESTIONNAIRE_USER_ID", value_name = "id")]
    user: Option<u64>,

    /// Course-module id of the activity
    #[arg(long)]
    cmid: u64,

    /// index, respond, resume, nextpage, previouspage, or review
    #[arg(long)]
    action: Option<String>,

    /// Response to continue
    #[arg(long)]
    rid: Option<i64>,

    /// Page the request starts from
    #[arg(long, allow_negative_numbers = true)]
    pagenum: Option<i64>,

    /// Submitted response to review
    #[arg(long = "submission-id")]
    submission_id: Option<i64>,

    #[arg(long, value_enum, default_value_t = Navigation::Conditional)]
    navigation: Navigation,

    /// Evaluate open/close windows at this RFC 3339 instant instead of now
    #[arg(long, value_name = "rfc3339")]
    now: Option<DateTime<Utc>>,

    /// Pretty-print the output envelope
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn mobile_args(&self) -> MobileArgs {
        MobileArgs {
            rid: self.rid,
            action: self.action.clone(),
            pagenum: self.pagenum,
            submissionid: self.submission_id,
            ..MobileArgs::new(CourseModuleId::new(self.cmid))
        }
    }

    fn caller(&self) -> UserIdentity {
        self.user
            .map_or(UserIdentity::Guest, |id| UserIdentity::User(UserId::new(id)))
    }

    fn clock(&self) -> Clock {
        self.now.map_or(Clock::System, Clock::fixed)
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::load(&args.fixture)?;
    let (repo, grants) = fixture.into_repository()?;
    info!(
        fixture = %args.fixture.display(),
        grants = grants.len(),
        "loaded questionnaire fixture"
    );

    let storage = Storage::from_repository(repo);
    let controller = ActivityPageController::from_storage(
        args.clock(),
        &storage,
        Arc::new(RoleAccessPolicy::from_grants(grants)),
    )
    .with_navigation(args.navigation.policy());
    let service = MobileOutputService::new(controller, Arc::new(HtmlRenderer::new()?));

    let content = service.view_activity(args.mobile_args(), args.caller())?;
    let out = if args.pretty {
        serde_json::to_string_pretty(&content)?
    } else {
        serde_json::to_string(&content)?
    };
    println!("{out}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_mobile_args() {
        let args = Args::parse_from([
            "questionnaire-mobile",
            "--fixture",
            "survey.json",
            "--user",
            "8",
            "--cmid",
            "21",
            "--action",
            "nextpage",
            "--pagenum",
            "-1",
        ]);
        let mobile = args.mobile_args();
        assert_eq!(mobile.cmid, CourseModuleId::new(21));
        assert_eq!(mobile.action.as_deref(), Some("nextpage"));
        assert_eq!(mobile.pagenum, Some(-1));
        assert_eq!(args.caller(), UserIdentity::User(UserId::new(8)));
        assert_eq!(args.navigation, Navigation::Conditional);
    }

    #[test]
    fn missing_user_calls_as_guest_with_fixed_clock() {
        let args = Args::parse_from([
            "questionnaire-mobile",
            "--fixture",
            "survey.json",
            "--cmid",
            "1",
            "--now",
            "2023-11-14T22:13:20Z",
            "--navigation",
            "sequential",
        ]);
        assert_eq!(args.caller(), UserIdentity::Guest);
        assert!(matches!(args.clock(), Clock::Fixed(_)));
        assert_eq!(args.navigation, Navigation::Sequential);
    }

    #[test]
    fn runs_against_bundled_fixture() {
        let args = Args::parse_from([
            "questionnaire-mobile",
            "--fixture",
            concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/workshop.json"),
            "--user",
            "8",
            "--cmid",
            "21",
            "--action",
            "nextpage",
            "--now",
            "2023-11-14T22:13:20Z",
        ]);
        assert!(run(&args).is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
