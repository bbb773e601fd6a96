//! Command implementations over `yookye_core`.

use std::sync::Arc;
use std::time::Duration;

use yookye_core::api::ApiClient;
use yookye_core::auth::AuthManager;
use yookye_core::config::ClientConfig;
use yookye_core::jobs::{JobEvent, JobPoller, PollHandle, PollPolicy};
use yookye_core::models::auth::{NewUser, ProfileUpdate};
use yookye_core::models::travel::TravelForm;
use yookye_core::session::SessionStore;
use yookye_core::travel::TravelApi;
use yookye_core::user::UserApi;

use crate::cli::Commands;
use crate::error::{Error, Result};

/// Delay before printing a fetched result, giving server-side
/// persistence time to settle.
const RESULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

fn client() -> Result<ApiClient> {
    let store = Arc::new(SessionStore::open_default()?);
    Ok(ApiClient::new(&ClientConfig::from_env(), store)?)
}

pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let auth = AuthManager::new(client()?);
            let user = auth.login(&email, &password).await?;
            println!("Logged in as {}", user.email);
        }

        Commands::Register {
            email,
            password,
            name,
            username,
        } => {
            let auth = AuthManager::new(client()?);
            let user = auth
                .register(&NewUser {
                    email,
                    password,
                    name,
                    username,
                })
                .await?;
            println!("Registered and logged in as {}", user.email);
        }

        Commands::Logout => {
            let auth = AuthManager::new(client()?);
            auth.logout().await?;
            println!("Logged out");
        }

        Commands::Profile => {
            let auth = AuthManager::new(client()?);
            match auth.restore_session().await {
                Some(user) => {
                    println!("id:       {}", user.id);
                    println!("email:    {}", user.email);
                    if let Some(name) = &user.name {
                        println!("name:     {name}");
                    }
                    if let Some(username) = &user.username {
                        println!("username: {username}");
                    }
                    if let Some(exp) = auth.current_claims().and_then(|c| c.exp) {
                        println!("token exp: {exp}");
                    }
                }
                None => println!("Not logged in"),
            }
        }

        Commands::UpdateProfile { name, username } => {
            if name.is_none() && username.is_none() {
                return Err(Error::Custom(
                    "Nothing to update: pass --name and/or --username".into(),
                ));
            }
            let auth = AuthManager::new(client()?);
            let user = auth.update_profile(&ProfileUpdate { name, username }).await?;
            println!("Profile updated for {}", user.email);
        }

        Commands::Destinations => {
            let travel = TravelApi::new(client()?);
            for destination in travel.destinations().await? {
                match &destination.region {
                    Some(region) => println!("{:<24} {region}", destination.name),
                    None => println!("{}", destination.name),
                }
            }
        }

        Commands::Dashboard => {
            let user = UserApi::new(client()?);
            let dashboard = user.dashboard().await?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }

        Commands::ExportData => {
            let user = UserApi::new(client()?);
            let export = user.export_data().await?;
            println!("{}", serde_json::to_string_pretty(&export)?);
        }

        Commands::Travels => {
            let travel = TravelApi::new(client()?);
            let travels = travel.my_travels().await?;
            if travels.is_empty() {
                println!("No travel requests yet");
            }
            for entry in travels {
                println!(
                    "{}  {:<14} {}",
                    entry.id,
                    entry.status,
                    entry.passions.join(", ")
                );
            }
        }

        Commands::Submit { file, no_watch } => {
            let contents = std::fs::read_to_string(&file)?;
            let form: TravelForm = serde_json::from_str(&contents)?;

            let travel = TravelApi::new(client()?);
            let (response, watcher) =
                yookye_core::jobs::submit_and_watch(&travel, &form, PollPolicy::default()).await?;

            println!("Request accepted: {}", response.travel_id);
            if let Some(next_steps) = &response.next_steps {
                println!("{next_steps}");
            }

            match watcher {
                Some(handle) if !no_watch => watch_events(handle).await?,
                Some(handle) => {
                    handle.cancel();
                    if let Some(job_id) = &response.external_job_id {
                        println!("Job launched: {job_id} (resume with `yookye watch {job_id}`)");
                    }
                }
                None => log::info!("no recommendation job launched for this request"),
            }
        }

        Commands::Watch { job_id } => {
            let travel = TravelApi::new(client()?);
            let handle = JobPoller::spawn(travel, job_id, PollPolicy::default());
            watch_events(handle).await?;
        }

        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Drain watcher events, logging progress and printing the final result.
async fn watch_events(mut handle: PollHandle) -> Result<()> {
    while let Some(event) = handle.next_event().await {
        match event {
            JobEvent::Status {
                status,
                attempt,
                progress,
            } => {
                log::info!("job {status}: {progress}% (check {attempt})");
            }
            JobEvent::Done { result } => {
                log::info!("search completed, collecting packages");
                tokio::time::sleep(RESULT_SETTLE_DELAY).await;
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            JobEvent::Failed { message } => {
                return Err(Error::Custom(message));
            }
            JobEvent::TimedOut { attempts } => {
                return Err(Error::Custom(format!(
                    "Timed out after {attempts} checks: the search is taking longer than expected. Try again later."
                )));
            }
        }
    }
    Err(Error::Custom("watch cancelled".into()))
}
