//! Greeting-template settings form.
//!
//! A plain load/edit/save form over the `/templates` resource. The server
//! owns the canonical record: both load and save replace local state
//! wholesale with what the server returns, so normalization done remotely
//! always wins.

use std::sync::Arc;

use crate::api::types::{GreetingTemplates, GreetingUpdate};
use crate::api::ApiClient;
use crate::PanelError;

use super::GENERIC_ERROR_MESSAGE;

pub struct GreetingPanel {
    client: Arc<ApiClient>,
    templates: Option<GreetingTemplates>,
    error: Option<String>,
    saved: bool,
}

impl GreetingPanel {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            templates: None,
            error: None,
            saved: false,
        }
    }

    pub fn templates(&self) -> Option<&GreetingTemplates> {
        self.templates.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True after a successful save, until the next edit.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn set_new_user(&mut self, text: impl Into<String>) {
        if let Some(templates) = &mut self.templates {
            templates.new_user = text.into();
            self.saved = false;
        }
    }

    pub fn set_returning_user(&mut self, text: impl Into<String>) {
        if let Some(templates) = &mut self.templates {
            templates.returning_user = text.into();
            self.saved = false;
        }
    }

    pub fn set_consecutive_user(&mut self, text: impl Into<String>) {
        if let Some(templates) = &mut self.templates {
            templates.consecutive_user = text.into();
            self.saved = false;
        }
    }

    pub async fn load(&mut self) -> Result<(), PanelError> {
        match self.client.greeting_templates().await {
            Ok(templates) => {
                self.templates = Some(templates);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.fail("greeting templates load failed", &e);
                Err(e.into())
            }
        }
    }

    /// Submit the three editable templates. The troll-greeting flag stays
    /// server-side and is never part of the request.
    pub async fn save(&mut self) -> Result<(), PanelError> {
        let Some(current) = &self.templates else {
            tracing::debug!("skipping greeting save before load");
            return Ok(());
        };
        let update = GreetingUpdate {
            new_user: current.new_user.clone(),
            returning_user: current.returning_user.clone(),
            consecutive_user: current.consecutive_user.clone(),
        };

        match self.client.save_greeting_templates(&update).await {
            Ok(templates) => {
                self.templates = Some(templates);
                self.error = None;
                self.saved = true;
                Ok(())
            }
            Err(e) => {
                self.fail("greeting templates save failed", &e);
                Err(e.into())
            }
        }
    }

    fn fail(&mut self, action: &str, error: &crate::api::ApiError) {
        tracing::error!("{action}: {error}");
        self.error = Some(GENERIC_ERROR_MESSAGE.to_string());
    }
}
