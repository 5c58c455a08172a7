//! Video library controller: browse, search and edit the clip catalog.

use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::store::{require_user, IdentityProvider, VideoCatalog};
use crate::types::DbId;
use crate::video::{Role, Video, VideoForm};

/// Number of loaded videos per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub beginning: usize,
    pub middle: usize,
    pub end: usize,
}

impl RoleCounts {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Beginning => self.beginning,
            Role::Middle => self.middle,
            Role::End => self.end,
        }
    }
}

pub struct VideoLibrary<S> {
    store: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
    filter: Option<Role>,
    search: String,
    videos: Vec<Video>,
    last_error: Option<String>,
}

impl<S: VideoCatalog> VideoLibrary<S> {
    pub fn new(store: Arc<S>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            filter: None,
            search: String::new(),
            videos: Vec::new(),
            last_error: None,
        }
    }

    pub fn filter(&self) -> Option<Role> {
        self.filter
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Loaded videos matching the search text.
    pub fn visible(&self) -> Vec<&Video> {
        self.videos
            .iter()
            .filter(|v| v.matches_search(&self.search))
            .collect()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn counts(&self) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for v in &self.videos {
            match v.role {
                Role::Beginning => counts.beginning += 1,
                Role::Middle => counts.middle += 1,
                Role::End => counts.end += 1,
            }
        }
        counts
    }

    /// Reload with the current role filter.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let result = self.store.list_videos(self.filter).await;
        self.videos = self.record(result)?;
        Ok(())
    }

    pub async fn set_filter(&mut self, role: Option<Role>) -> Result<(), CoreError> {
        self.filter = role;
        self.load().await
    }

    /// Fetch a video fresh from the catalog and pre-fill an editing form.
    pub async fn edit_form(&mut self, id: DbId) -> Result<VideoForm, CoreError> {
        let result = self.store.get_video(id).await;
        let video = self.record(result)?;
        Ok(VideoForm::from_video(&video))
    }

    /// Create a video, or update `editing` when given, then reload.
    pub async fn save(&mut self, form: &VideoForm, editing: Option<DbId>) -> Result<Video, CoreError> {
        self.last_error = None;
        let result = self.try_save(form, editing).await;
        let video = self.record(result)?;
        tracing::info!(video_id = video.id, created = editing.is_none(), "Video saved");
        self.load().await?;
        Ok(video)
    }

    async fn try_save(&self, form: &VideoForm, editing: Option<DbId>) -> Result<Video, CoreError> {
        match editing {
            Some(id) => {
                let patch = form.to_update()?;
                self.store.update_video(id, &patch).await
            }
            None => {
                let input = form.to_create()?;
                let owner = require_user(self.identity.as_ref()).await?;
                self.store.create_video(owner, &input).await
            }
        }
    }

    /// Delete a video (and every sequence item using it), then reload.
    pub async fn delete(&mut self, id: DbId) -> Result<(), CoreError> {
        let result = self.store.delete_video(id).await;
        self.record(result)?;
        self.load().await
    }

    fn record<T>(&mut self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }
}
