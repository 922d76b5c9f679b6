use chrono::Local;
use tracing::info;

use super::data::{EncodedImage, Project, ProjectCategory};
use crate::media::PreviewFrame;

/// The Library keeps the projects created during this session.
///
/// Nothing is written to disk; closing the app discards every project.
#[derive(Debug, Default)]
pub struct Library {
    projects: Vec<Project>,
    next_id: u64,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a project from a freshly loaded image and return its id
    pub fn create(&mut self, image: EncodedImage, category: ProjectCategory) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        self.projects.push(Project {
            id,
            title: "New Project".to_string(),
            created_at: Local::now().format("%m/%d/%Y, %-I:%M %p").to_string(),
            image,
            thumbnail: None,
            category,
        });

        info!(id, category = category.label(), "created project");
        id
    }

    pub fn get(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Replace a project's image with an accepted edit.
    ///
    /// The thumbnail is cleared until a new one is generated.
    pub fn commit_image(&mut self, id: u64, image: EncodedImage) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if project.image != image {
            project.image = image;
            project.thumbnail = None;
            project.category = ProjectCategory::Edit;
        }
        true
    }

    /// Store a thumbnail rendered from `source`.
    ///
    /// Ignored when the project's image has since been replaced.
    pub fn set_thumbnail(&mut self, id: u64, source: &EncodedImage, thumbnail: PreviewFrame) -> bool {
        match self.projects.iter_mut().find(|p| p.id == id) {
            Some(project) if project.image == *source => {
                project.thumbnail = Some(thumbnail);
                true
            }
            _ => false,
        }
    }

    /// Projects ordered newest first
    pub fn recent(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().rev()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
