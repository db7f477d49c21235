//! Command-line front end over the watcher and the notification store.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::api::ReservationSource;
use crate::models::{NewReservation, Notification, NotificationTone, Reservation};
use crate::notifications::format_date_time;
use crate::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "believe-notify",
    version,
    about = "Watches your Believe salon reservations and keeps the status notifications"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll reservations until Ctrl-C, printing new notifications
    Watch {
        /// Email to watch; remembered for later runs
        #[arg(long)]
        email: Option<String>,
    },
    /// Submit a booking and remember its email
    Book(BookArgs),
    /// List reservations with their status
    Reservations {
        #[arg(long)]
        email: Option<String>,
    },
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    #[command(subcommand)]
    Email(EmailCommand),
    #[command(subcommand)]
    Auth(AuthCommand),
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    /// Service id or title
    #[arg(long)]
    pub service: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// HH:MM
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    List,
    Read { id: String },
    ReadAll,
    Remove { id: String },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    Show,
    Set { email: String },
    Forget,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    SetToken { token: String },
    Logout,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        interval_secs: Option<u64>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

pub async fn dispatch(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Watch { email } => watch(state, email).await,
        Command::Book(args) => book(state, args).await,
        Command::Reservations { email } => reservations(state, email).await,
        Command::Notifications(cmd) => notifications(state, cmd),
        Command::Email(cmd) => email(state, cmd).await,
        Command::Auth(cmd) => auth(state, cmd),
        Command::Settings(cmd) => settings(state, cmd),
    }
}

async fn watch(state: &AppState, email: Option<String>) -> Result<()> {
    let active = match email {
        Some(email) => state.watcher.watch_email(&email).await?,
        None => state.watcher.resume().await?,
    };

    if !active {
        println!("No email to watch. Run `believe-notify watch --email <address>` first.");
        return Ok(());
    }

    let mut updates = state.store.subscribe();
    let mut seen: HashSet<String> = state
        .store
        .notifications()
        .into_iter()
        .map(|n| n.id)
        .collect();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                for notification in current.iter().filter(|n| !seen.contains(&n.id)) {
                    print_notification(notification);
                }
                seen = current.into_iter().map(|n| n.id).collect();
            }
            _ = &mut shutdown => break,
        }
    }

    state.watcher.stop().await
}

async fn book(state: &AppState, args: BookArgs) -> Result<()> {
    let booking = NewReservation {
        customer_name: args.name,
        email: args.email.trim().to_string(),
        phone: args.phone,
        service: args.service,
        date: args.date,
        time: args.time,
        message: args.message.filter(|m| !m.trim().is_empty()),
    };

    let created = state.api.create_reservation(&booking).await?;
    state.emails.remember(&booking.email)?;

    println!(
        "Reservation {} for {} recorded ({}).",
        created.id.as_deref().unwrap_or("-"),
        format_date_time(&created.date, &created.time),
        created.canonical_status().label()
    );
    Ok(())
}

async fn reservations(state: &AppState, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email.trim().to_string(),
        None => state
            .emails
            .recall()?
            .ok_or_else(|| anyhow!("no remembered email; pass --email"))?,
    };

    let list = state.api.reservations_by_email(&email).await?;
    if list.is_empty() {
        println!("No reservation found for {email}.");
        return Ok(());
    }

    for reservation in &list {
        print_reservation(reservation);
    }

    let unread = state.store.unread_count();
    if unread > 0 {
        println!("{unread} unread notification(s).");
    }
    Ok(())
}

fn notifications(state: &AppState, command: NotificationsCommand) -> Result<()> {
    match command {
        NotificationsCommand::List => {
            let list = state.store.notifications();
            if list.is_empty() {
                println!("No notifications.");
            }
            for notification in &list {
                print_notification(notification);
            }
            println!("{} unread / {} total", state.store.unread_count(), list.len());
        }
        NotificationsCommand::Read { id } => {
            ensure_known(state, &id)?;
            state.store.mark_read(&id);
        }
        NotificationsCommand::ReadAll => state.store.mark_all_read(),
        NotificationsCommand::Remove { id } => {
            ensure_known(state, &id)?;
            state.store.remove(&id);
        }
        NotificationsCommand::Clear => state.store.clear(),
    }
    Ok(())
}

async fn email(state: &AppState, command: EmailCommand) -> Result<()> {
    match command {
        EmailCommand::Show => match state.emails.recall()? {
            Some(email) => println!("{email}"),
            None => println!("No email remembered."),
        },
        EmailCommand::Set { email } => {
            if state.emails.remember(&email)?.is_none() {
                bail!("email must not be blank");
            }
        }
        EmailCommand::Forget => state.watcher.forget_email().await?,
    }
    Ok(())
}

fn auth(state: &AppState, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::SetToken { token } => state.token.set(&token),
        AuthCommand::Logout => state.token.clear(),
    }
}

fn settings(state: &AppState, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&state.settings.watch())?);
            println!("effective API URL: {}", state.api.base_url());
        }
        SettingsCommand::Set {
            api_url,
            interval_secs,
            timeout_secs,
        } => {
            let mut watch = state.settings.watch();
            if let Some(url) = api_url {
                watch.api_base_url = url;
            }
            if let Some(secs) = interval_secs {
                watch.poll_interval_secs = secs;
            }
            if let Some(secs) = timeout_secs {
                watch.fetch_timeout_secs = secs;
            }
            state.settings.update_watch(watch)?;
        }
    }
    Ok(())
}

fn ensure_known(state: &AppState, id: &str) -> Result<()> {
    if state.store.get(id).is_none() {
        bail!("no notification with id {id}");
    }
    Ok(())
}

fn print_notification(notification: &Notification) {
    let marker = if notification.read { " " } else { "*" };
    let tone = match notification.tone() {
        NotificationTone::Confirmation => "✔",
        NotificationTone::Status => "•",
    };
    println!(
        "{marker} {tone} {}  {}",
        notification
            .created_at
            .with_timezone(&chrono::Local)
            .format("%d/%m/%Y %H:%M"),
        notification.title
    );
    println!("      {}", notification.message);
    println!("      id: {}", notification.id);
}

fn print_reservation(reservation: &Reservation) {
    println!(
        "{}  {}  [{}]",
        format_date_time(&reservation.date, &reservation.time),
        reservation.service,
        reservation.canonical_status().label()
    );
}
