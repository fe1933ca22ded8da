use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::Receiver;
use tracing::debug;

use fluster_app_core::backend::HttpBackend;
use fluster_app_core::persistence::FileFragmentStore;
use fluster_app_core::{
    dashboard_vm_now, discovery_vm, setup_vm, AppCommand, AppState, ChannelNotifier, FlusterApp,
    Notification,
};
use fluster_core::{Partitions, Server, ServerQuery, ViewState};

use crate::CliContext;

pub type CliApp = FlusterApp<HttpBackend, HttpBackend, FileFragmentStore, ChannelNotifier>;

/// Connects to the executor and wires a fresh app around it.
pub fn connect(ctx: &CliContext) -> Result<(CliApp, Receiver<Notification>)> {
    let backend = HttpBackend::connect(&ctx.backend)
        .with_context(|| format!("Invalid backend address {}", ctx.backend))?;
    let fragments = match &ctx.fragment_path {
        Some(path) => FileFragmentStore::at(path),
        None => FileFragmentStore::new()?,
    };
    let (notifier, rx) = ChannelNotifier::channel(fluster_config::EVENT_BUFFER);
    let app = FlusterApp::new(backend.clone(), backend, fragments, notifier);
    Ok((app, rx))
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(msg.to_string());
    Ok(pb)
}

fn print_notice(n: &Notification) {
    eprintln!("!! {}", n.title);
    eprintln!("   {}", n.description);
}

fn drain_notices(rx: &mut Receiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        print_notice(&n);
    }
}

/// Dispatches `cmd` and follows each failure notice's retry up to `ctx.retries` times.
pub async fn run_command(
    ctx: &CliContext,
    app: &CliApp,
    rx: &mut Receiver<Notification>,
    cmd: AppCommand,
) -> Result<()> {
    let mut result = app.dispatch(cmd).await;
    let mut attempt = 0;
    while let Err(e) = result {
        let notice = rx.try_recv().ok();
        if let Some(n) = &notice {
            print_notice(n);
        }

        let retry = notice.filter(|n| n.retry.is_some() && attempt < ctx.retries);
        let Some(n) = retry else {
            return Err(anyhow!(e));
        };
        attempt += 1;
        debug!(attempt, "retrying");
        println!(":: Retrying ({attempt}/{})", ctx.retries);
        result = match app.retry(&n).await {
            Some(r) => r,
            None => Err(e),
        };
    }
    Ok(())
}

async fn refreshed(ctx: &CliContext) -> Result<(CliApp, Receiver<Notification>)> {
    let (app, mut rx) = connect(ctx)?;
    run_command(ctx, &app, &mut rx, AppCommand::Refresh).await?;
    Ok((app, rx))
}

pub async fn cmd_versions(ctx: &CliContext) -> Result<Partitions> {
    println!(":: Fetching client versions...");
    let pb = spinner("Querying backend")?;
    let refreshed = refreshed(ctx).await;
    pb.finish_and_clear();
    let (app, _rx) = refreshed?;

    let vm = setup_vm(&app.state());
    let sections = [
        ("Installed", &vm.partitions.installed),
        ("Installing", &vm.partitions.installing),
        ("Available", &vm.partitions.available),
    ];
    for (title, versions) in sections {
        if versions.is_empty() {
            continue;
        }
        println!("\n:: {title}");
        for v in versions {
            println!("   {:<24} {:<22} {}", v.id, v.name, v.size);
        }
    }
    Ok(vm.partitions)
}

pub async fn cmd_install(ctx: &CliContext, id: &str) -> Result<()> {
    let (app, mut rx) = refreshed(ctx).await?;
    let pb = spinner(&format!("Installing {id}"))?;
    let result = run_command(ctx, &app, &mut rx, AppCommand::Install(id.to_string())).await;
    pb.finish_and_clear();
    result?;
    println!(":: Installed {id}");
    Ok(())
}

pub async fn cmd_uninstall(ctx: &CliContext, id: &str) -> Result<()> {
    let (app, mut rx) = refreshed(ctx).await?;
    run_command(ctx, &app, &mut rx, AppCommand::Uninstall(id.to_string())).await?;
    println!(":: Uninstalled {id}");
    Ok(())
}

pub async fn cmd_launch(ctx: &CliContext, id: &str) -> Result<()> {
    let (app, mut rx) = connect(ctx)?;
    run_command(ctx, &app, &mut rx, AppCommand::Launch(id.to_string())).await?;
    println!(":: Launched {id}");
    Ok(())
}

/// Listens on the discovery channel for `listen` and prints what matched.
pub async fn cmd_servers(ctx: &CliContext, query: ServerQuery, listen: Duration) -> Result<Vec<Server>> {
    let (app, mut rx) = connect(ctx)?;
    run_command(ctx, &app, &mut rx, AppCommand::StartDiscovery).await?;

    let pb = spinner("Listening for servers")?;
    tokio::time::sleep(listen).await;
    pb.finish_and_clear();
    run_command(ctx, &app, &mut rx, AppCommand::StopDiscovery).await?;

    let vm = discovery_vm(&app.state(), &query);
    println!(":: {} server(s) discovered", vm.server_count);
    if let Some(msg) = vm.empty_message {
        println!("   {msg}");
    }
    for s in &vm.servers {
        println!("   {:<16} {:<24} {:<22} {}", s.id, s.name, s.version, s.address());
    }
    Ok(vm.servers)
}

/// Waits up to `listen` for `server_id` to be announced, then joins it.
pub async fn cmd_join(ctx: &CliContext, server_id: &str, user_id: u64, listen: Duration) -> Result<()> {
    let (app, mut rx) = connect(ctx)?;
    run_command(ctx, &app, &mut rx, AppCommand::StartDiscovery).await?;

    let pb = spinner(&format!("Waiting for {server_id}"))?;
    let deadline = tokio::time::Instant::now() + listen;
    while app.discovery().get(server_id).is_none() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    pb.finish_and_clear();

    let cmd = AppCommand::JoinServer {
        server_id: server_id.to_string(),
        user_id,
    };
    let result = run_command(ctx, &app, &mut rx, cmd).await;
    run_command(ctx, &app, &mut rx, AppCommand::StopDiscovery).await?;
    result?;
    println!(":: Joined {server_id}");
    Ok(())
}

pub async fn cmd_setup(ctx: &CliContext) -> Result<()> {
    let (app, mut rx) = connect(ctx)?;
    let pb = spinner("Running setup")?;
    let result = run_command(ctx, &app, &mut rx, AppCommand::StartSetup).await;
    pb.finish_and_clear();
    result?;
    println!(":: Setup complete");
    Ok(())
}

/// Runs the startup sequence and prints the resulting view.
pub async fn cmd_status(ctx: &CliContext, search: &str) -> Result<AppState> {
    let (app, mut rx) = connect(ctx)?;
    app.load_initial_state().await;
    drain_notices(&mut rx);

    let state = app.state();
    println!(":: View: {}", state.view);
    if state.view == ViewState::Dashboard {
        let vm = dashboard_vm_now(&state, search);
        println!("   {}", vm.greeting);
        println!("   Clients:   {}", vm.total_clients);
        println!("   Play time: {}", vm.total_play_time);
        for card in &vm.clients {
            let badge = if card.running { " [running]" } else { "" };
            let disk = card.disk_usage.as_deref().unwrap_or(card.size.as_str());
            println!(
                "   - {}{badge}: {}, last played {} ({disk})",
                card.name, card.play_time, card.last_played
            );
        }
    }
    Ok(state)
}

pub async fn cmd_view(ctx: &CliContext, view: ViewState) -> Result<()> {
    let (app, mut rx) = connect(ctx)?;
    run_command(ctx, &app, &mut rx, AppCommand::Navigate(view)).await?;
    println!(":: Switched to {view}");
    Ok(())
}
