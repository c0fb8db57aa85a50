//! Admin CRUD pass-throughs.
//!
//! Direct wrappers over the dashboard endpoints for users, preference
//! tags, gym locations, and exercises. No decision logic lives here.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use spotter_shared::types::UserRecord;

use crate::api::{ApiClient, NewAccount};
use crate::error::Result;

/// A preference tag users attach to their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub name: String,
}

/// A gym location shown on the discovery map. Coordinates are optional;
/// older records carry only a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymLocation {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A catalogued exercise from the recommendation browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub muscles: Vec<String>,
}

impl ApiClient {
    // -- users --------------------------------------------------------

    pub async fn get_users(&self) -> Result<Vec<UserRecord>> {
        let resp = self.request(Method::GET, "/users/getUsers").send().await?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    /// Admin-side registration; unlike self sign-up this may set the
    /// account type and demographics directly.
    pub async fn create_user(&self, account: &NewAccount) -> Result<()> {
        let resp = self
            .request(Method::POST, "/users/register")
            .json(account)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    pub async fn delete_user(&self, email: &str) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &format!("/users/{email}"))
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    // -- preference tags ----------------------------------------------

    pub async fn get_preferences(&self) -> Result<Vec<Preference>> {
        let resp = self.request(Method::GET, "/preferences").send().await?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn create_preference(&self, preference: &Preference) -> Result<()> {
        let resp = self
            .request(Method::POST, "/preferences")
            .json(preference)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    /// Preferences are keyed by name on the wire.
    pub async fn delete_preference(&self, name: &str) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &format!("/preferences/{name}"))
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    // -- gym locations ------------------------------------------------

    pub async fn get_locations(&self) -> Result<Vec<GymLocation>> {
        let resp = self.request(Method::GET, "/locations").send().await?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn create_location(&self, location: &GymLocation) -> Result<()> {
        let resp = self
            .request(Method::POST, "/locations")
            .json(location)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    pub async fn delete_location(&self, id: &str) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &format!("/locations/{id}"))
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    // -- exercises ----------------------------------------------------

    pub async fn get_exercises(&self) -> Result<Vec<Exercise>> {
        let resp = self.request(Method::GET, "/exercises").send().await?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn create_exercise(&self, exercise: &Exercise) -> Result<()> {
        let resp = self
            .request(Method::POST, "/exercises")
            .json(exercise)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    pub async fn update_exercise(&self, id: &str, exercise: &Exercise) -> Result<()> {
        let resp = self
            .request(Method::PUT, &format!("/exercises/{id}"))
            .json(exercise)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    pub async fn delete_exercise(&self, id: &str) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &format!("/exercises/{id}"))
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }
}
