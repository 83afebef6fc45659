//! View-State Router
//!
//! Which screen is showing. Plain data: navigating replaces the value, there
//! is no history stack and no guarded transition.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::domain::EntityId;

/// Escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'/').add(b'?').add(b'#').add(b'%');

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Dashboard,
    ProjectList,
    ProjectDetail { project_id: EntityId },
    Kanban,
    Financials,
    Crm,
    Automation,
    Resources,
    Ideas,
    Whiteboard,
    Snippets,
    Settings,
}

impl View {
    pub fn project(project_id: impl Into<EntityId>) -> Self {
        View::ProjectDetail { project_id: project_id.into() }
    }

    /// Deep-link form, e.g. `/projects/<id>`
    pub fn path(&self) -> String {
        let path = match self {
            View::Dashboard => "/",
            View::ProjectList => "/projects",
            View::ProjectDetail { project_id } => {
                return format!("/projects/{}", utf8_percent_encode(project_id, SEGMENT));
            }
            View::Kanban => "/kanban",
            View::Financials => "/financials",
            View::Crm => "/crm",
            View::Automation => "/automation",
            View::Resources => "/resources",
            View::Ideas => "/ideas",
            View::Whiteboard => "/whiteboard",
            View::Snippets => "/snippets",
            View::Settings => "/settings",
        };
        path.to_string()
    }

    /// Parse a deep link; query string and fragment are ignored
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let view = match segments.as_slice() {
            [] => View::Dashboard,
            ["projects"] => View::ProjectList,
            ["projects", id] => {
                let id = percent_decode_str(id).decode_utf8().ok()?;
                View::project(id.into_owned())
            }
            ["kanban"] => View::Kanban,
            ["financials"] => View::Financials,
            ["crm"] => View::Crm,
            ["automation"] => View::Automation,
            ["resources"] => View::Resources,
            ["ideas"] => View::Ideas,
            ["whiteboard"] => View::Whiteboard,
            ["snippets"] => View::Snippets,
            ["settings"] => View::Settings,
            _ => return None,
        };
        Some(view)
    }

    /// Heading shown in the title bar
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::ProjectList => "Projects",
            View::ProjectDetail { .. } => "Project",
            View::Kanban => "Kanban",
            View::Financials => "Financials",
            View::Crm => "Stakeholders",
            View::Automation => "Automations",
            View::Resources => "Resources",
            View::Ideas => "Ideas",
            View::Whiteboard => "Whiteboard",
            View::Snippets => "Snippets",
            View::Settings => "Settings",
        }
    }
}
