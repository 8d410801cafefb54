//! Demo entrypoint: connect with credentials from the environment and greet
//! the first department in the directory.
//!
//! For a high-level introduction see the project README.

use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use wecom::{
    api::{WorkClient, API_BASE},
    auth::{AgentId, Credentials},
    message::Recipient,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let corp_id =
        env::var("WECOM_CORP_ID").expect("No $WECOM_CORP_ID environment variable found");
    let secret = env::var("WECOM_SECRET").expect("No $WECOM_SECRET environment variable found");
    let agent_id =
        env::var("WECOM_AGENT_ID").expect("No $WECOM_AGENT_ID environment variable found");

    let credentials = Credentials { corp_id, secret };

    let client = match WorkClient::connect(API_BASE.into(), AgentId(agent_id), &credentials).await
    {
        Ok(x) => x,
        Err(e) => {
            error!("Failed to connect: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Connected: {} departments, {} users",
        client.departments().len(),
        client.users().len()
    );

    let Some(department) = client.departments().values().next() else {
        warn!("No departments visible to this application");
        return;
    };

    let to = Recipient::Parties(department.id.to_string());
    let greeting = format!("hello everyone in {}", department.name);

    match client.send_text(&to, greeting).await {
        Ok(receipt) => match receipt.invalidparty {
            Some(x) => warn!("Sent, but some parties were unreachable: {}", x),
            None => info!("Sent"),
        },
        Err(e) => {
            error!("Failed to send: {}", e);
            std::process::exit(1);
        }
    }
}
