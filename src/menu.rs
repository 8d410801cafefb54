//! Manage the application's custom menu.

use crate::{api, api::WorkClient, error::WorkError};
use serde::{Deserialize, Serialize};
use url::Url;

/// The application menu: up to three top-level buttons, each bearing up to
/// five entries.
#[derive(Serialize)]
pub struct Menu {
    pub button: Vec<MenuButton>,
}

#[derive(Serialize)]
pub struct MenuButton {
    pub name: String,
    pub sub_button: Vec<MenuEntry>,
}

/// Our supported subset of the platform's menu entry types.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuEntry {
    /// Pushes `key` back to the application's callback on tap.
    Click { name: String, key: String },
    /// Opens the URL.
    View { name: String, url: Url },
}

#[derive(Deserialize)]
struct MenuResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
}

impl WorkClient {
    /// Install the application menu, clearing any existing one first.
    pub async fn create_menu(&self, menu: &Menu) -> Result<(), WorkError> {
        self.delete_menu().await?;

        let _: MenuResponse = api::dispatch(self.post("/cgi-bin/menu/create").json(menu)).await?;

        Ok(())
    }

    /// Remove the application menu.
    // Deletion goes out as a GET despite being a write; the API accepts the
    // verb and deletes regardless.
    pub async fn delete_menu(&self) -> Result<(), WorkError> {
        let _: MenuResponse = api::dispatch(self.get("/cgi-bin/menu/delete")).await?;

        Ok(())
    }
}
