mod config;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    load_bootstrap, stats, BillDetailClient, BillQueryController, ControllerEvent, HttpBillApi,
};
use shared::{
    domain::{BillId, FilterField, VoteOutcome},
    protocol::{BillDetail, BillSummary, DashboardStats, Pagination},
};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Terminal view of the assembly bill dashboard")]
struct Args {
    /// Backend base URL; overrides dashboard.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Title search term.
    #[arg(long)]
    search: Option<String>,
    /// Month filter (YYYY-MM).
    #[arg(long)]
    month: Option<String>,
    /// Processing classification filter.
    #[arg(long)]
    pass_gubn: Option<String>,
    /// Procedural stage filter.
    #[arg(long)]
    proc_stage: Option<String>,
    /// Page to show.
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Show one bill's full record instead of the list.
    #[arg(long)]
    bill: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);
    info!(%server_url, "querying dashboard backend");
    let api = Arc::new(HttpBillApi::new(server_url));

    if let Some(bill_id) = args.bill {
        let detail = api.fetch_bill(&BillId::new(bill_id)).await?;
        print_bill_detail(&detail);
        return Ok(());
    }

    let bootstrap = load_bootstrap(api.as_ref(), api.as_ref()).await;
    if let Some(stats) = &bootstrap.stats {
        print_stats(stats);
    }

    let controller = BillQueryController::new(api);
    let mut events = controller.subscribe_events();

    if let Some(month) = &args.month {
        controller.set_filter(FilterField::Month, month.clone()).await;
    }
    if let Some(pass_gubn) = &args.pass_gubn {
        controller
            .set_filter(FilterField::PassGubn, pass_gubn.clone())
            .await;
    }
    if let Some(proc_stage) = &args.proc_stage {
        controller
            .set_filter(FilterField::ProcStage, proc_stage.clone())
            .await;
    }
    if let Some(search) = &args.search {
        controller.submit_search(search).await;
    }
    if args.page > 1 {
        controller.go_to_page(args.page).await;
    } else if args.month.is_none()
        && args.pass_gubn.is_none()
        && args.proc_stage.is_none()
        && args.search.is_none()
    {
        controller.reload().await;
    }

    let mut latest = None;
    loop {
        match events.try_recv() {
            Ok(ControllerEvent::BillsLoaded { bills, pagination }) => {
                latest = Some((bills, pagination));
            }
            Ok(ControllerEvent::LoadFailed(message)) => bail!("bill list load failed: {message}"),
            Ok(ControllerEvent::LoadStarted) => {}
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    let Some((bills, pagination)) = latest else {
        bail!("no bill list was loaded");
    };

    let active = controller.active_filters().await;
    if !active.is_empty() {
        let chips: Vec<String> = active
            .iter()
            .map(|f| format!("{}={}", f.field.as_str(), f.value))
            .collect();
        println!("적용된 필터: {}\n", chips.join(", "));
    }

    for bill in &bills {
        print_bill_card(bill);
    }
    if bills.is_empty() {
        println!("표시할 의안이 없습니다.");
    }
    print_pagination(&controller.snapshot().await, &pagination);
    Ok(())
}

fn print_stats(stats: &DashboardStats) {
    println!("전체 의안: {}", stats.total_bills);
    println!(
        "계류의안: {} ({:.1}%)",
        stats.pending_bills,
        stats::percent(stats.pending_bills, stats.total_bills)
    );
    println!(
        "처리의안: {} ({:.1}%)",
        stats.processed_bills,
        stats::percent(stats.processed_bills, stats.total_bills)
    );
    println!(
        "처리의안 중 표결 기록 있음: {} / 없음: {}",
        stats.processed_with_votes, stats.processed_no_votes
    );
    let rollup = stats::stage_rollup(&stats.proc_stage_stats);
    if !rollup.is_empty() {
        let parts: Vec<String> = rollup
            .iter()
            .map(|s| {
                format!(
                    "{} {} ({:.1}%)",
                    s.label,
                    s.count,
                    stats::percent(s.count, stats.total_bills)
                )
            })
            .collect();
        println!("진행단계: {}", parts.join(" | "));
    }
    println!();
}

fn print_bill_card(bill: &BillSummary) {
    println!("## {}", bill.title);
    let mut meta = Vec::new();
    if let Some(date) = bill.proposal_date {
        meta.push(format!("제안일 {date}"));
    }
    if let Some(name) = &bill.proposer_name {
        meta.push(format!("제안자 {name}"));
    }
    if let Some(pass_gubn) = &bill.pass_gubn {
        meta.push(pass_gubn.clone());
    }
    if let Some(stage) = &bill.proc_stage_cd {
        meta.push(stage.clone());
    }
    if !meta.is_empty() {
        println!("  {}", meta.join(" · "));
    }
    if bill.tally.has_votes() {
        println!(
            "  표결 ({}명 참여): 찬성 {} ({:.1}%) / 반대 {} ({:.1}%) / 기권 {} / 불참 {}",
            bill.tally.member_count,
            bill.tally.vote_for,
            bill.tally.share(VoteOutcome::For),
            bill.tally.vote_against,
            bill.tally.share(VoteOutcome::Against),
            bill.tally.vote_abstain,
            bill.tally.vote_absent,
        );
    } else {
        println!("  표결 진행 전");
    }
    println!();
}

fn print_pagination(state: &client_core::QueryState, pagination: &Pagination) {
    if pagination.pages <= 1 {
        return;
    }
    let window: Vec<String> = state
        .page_window()
        .map(|n| {
            if n == state.page {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();
    let prev = if state.can_go_prev() { "이전" } else { "--" };
    let next = if state.can_go_next() { "다음" } else { "--" };
    println!(
        "{} / {} 페이지  {prev} {} {next}",
        pagination.page,
        pagination.pages,
        window.join(" ")
    );
}

fn print_bill_detail(detail: &BillDetail) {
    println!("# {}", detail.title);
    println!("의안번호: {}", detail.bill_no.as_deref().unwrap_or("미상"));
    match detail.proposal_date {
        Some(date) => println!("제안일: {date}"),
        None => println!("제안일: 미상"),
    }
    println!("처리구분: {}", detail.pass_gubn.as_deref().unwrap_or("미상"));
    println!(
        "진행단계: {}",
        detail.proc_stage_cd.as_deref().unwrap_or("미상")
    );
    if let Some(url) = &detail.link_url {
        println!("원문: {url}");
    }

    if !detail.tally.has_votes() {
        println!("\n표결이 진행되지 않았습니다.");
        return;
    }

    println!("\n표결 결과 ({}명 참여)", detail.tally.member_count);
    for outcome in VoteOutcome::ALL {
        println!(
            "  {}: {} ({:.1}%)",
            outcome.label(),
            detail.tally.count(outcome),
            detail.tally.share(outcome)
        );
    }

    if !detail.party_votes.is_empty() {
        println!("\n정당별 표결");
        for party in &detail.party_votes {
            println!(
                "  {}: 찬성 {} / 반대 {} / 기권 {} / 불참 {}",
                party.party_name.as_deref().unwrap_or("무소속"),
                party.vote_for,
                party.vote_against,
                party.vote_abstain,
                party.vote_absent,
            );
        }
    }

    let by_outcome = &detail.member_votes_by_result;
    for (label, members) in [
        ("찬성", &by_outcome.favor),
        ("반대", &by_outcome.against),
        ("기권", &by_outcome.abstain),
        ("불참", &by_outcome.absent),
    ] {
        if members.is_empty() {
            continue;
        }
        println!("\n{label} ({}명)", members.len());
        for member in members {
            let name = member.member_name.as_deref().unwrap_or("미상");
            let party = member.party_name.as_deref().unwrap_or("무소속");
            match member.district_name.as_deref() {
                Some(district) if !district.is_empty() => {
                    println!("  {name} ({party} · {district})")
                }
                _ => println!("  {name} ({party})"),
            }
        }
    }
}
