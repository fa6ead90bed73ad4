//! The fixed set of backend operations and where they live.

use crate::request::RequestDescriptor;
use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const AUTH: &str = "auth";
pub const CONTENT: &str = "content";
pub const ASSESSMENT: &str = "assessment";
pub const PERSONALIZATION: &str = "personalization";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentKind {
    DigitalSkills,
    LearningStyle,
    TechComfort,
}

impl AssessmentKind {
    pub const ALL: [AssessmentKind; 3] = [
        AssessmentKind::DigitalSkills,
        AssessmentKind::LearningStyle,
        AssessmentKind::TechComfort,
    ];

    const fn path(&self) -> &'static str {
        match self {
            AssessmentKind::DigitalSkills => "/digital-skills",
            AssessmentKind::LearningStyle => "/learning-style",
            AssessmentKind::TechComfort => "/tech-comfort",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Profile,
    UpdateProfile,
    ListCourses,
    GetCourse(String),
    ListModules(String),
    ListLessons(String),
    GetLesson(String),
    GetProgress,
    UpdateProgress,
    GetCourseProgress(String),
    Assessment(AssessmentKind),
    SubmitAssessment(AssessmentKind),
    ChatSession,
    Chat,
    Recommendations,
    ContentInitialize,
    HealthCheck,
}

impl Operation {
    pub fn service(&self) -> &'static str {
        match self {
            Operation::Register
            | Operation::Login
            | Operation::Profile
            | Operation::UpdateProfile => AUTH,
            Operation::Assessment(_) | Operation::SubmitAssessment(_) => ASSESSMENT,
            Operation::ChatSession | Operation::Chat | Operation::Recommendations => {
                PERSONALIZATION
            }
            _ => CONTENT,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::Register
            | Operation::Login
            | Operation::UpdateProgress
            | Operation::SubmitAssessment(_)
            | Operation::ChatSession
            | Operation::Chat
            | Operation::ContentInitialize => Method::POST,
            Operation::UpdateProfile => Method::PUT,
            _ => Method::GET,
        }
    }

    /// Path template. `{id}` is replaced by the operation's identifier.
    pub fn template(&self) -> &'static str {
        match self {
            Operation::Register => "/register",
            Operation::Login => "/login",
            Operation::Profile | Operation::UpdateProfile => "/profile",
            Operation::ListCourses => "/courses",
            Operation::GetCourse(_) => "/courses/{id}",
            Operation::ListModules(_) => "/courses/{id}/modules",
            Operation::ListLessons(_) => "/modules/{id}/lessons",
            Operation::GetLesson(_) => "/lessons/{id}",
            Operation::GetProgress | Operation::UpdateProgress => "/progress",
            Operation::GetCourseProgress(_) => "/progress/courses/{id}",
            Operation::Assessment(kind) | Operation::SubmitAssessment(kind) => kind.path(),
            Operation::ChatSession => "/aria/sessions",
            Operation::Chat => "/aria/chat",
            Operation::Recommendations => "/aria/recommendations",
            Operation::ContentInitialize => "/content/initialize",
            Operation::HealthCheck => "/health",
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Operation::GetCourse(id)
            | Operation::ListModules(id)
            | Operation::ListLessons(id)
            | Operation::GetLesson(id)
            | Operation::GetCourseProgress(id) => Some(id),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        render(self.template(), self.id().into_iter().collect::<Vec<_>>().as_slice())
    }

    pub fn request(&self) -> RequestDescriptor {
        RequestDescriptor::new(self.method(), self.path())
    }
}

#[derive(Debug)]
enum PathSegment<'a> {
    Static(&'a str),
    Param,
}

fn parse(template: &str) -> Vec<PathSegment<'_>> {
    template
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                PathSegment::Param
            } else {
                PathSegment::Static(segment)
            }
        })
        .collect()
}

/// Fills `{param}` segments in order. Missing params render as empty segments.
fn render(template: &str, params: &[&str]) -> String {
    let mut params = params.iter();
    let mut path = String::new();
    for segment in parse(template) {
        path.push('/');
        match segment {
            PathSegment::Static(s) => path.push_str(s),
            PathSegment::Param => {
                if let Some(value) = params.next() {
                    path.push_str(&encode_segment(value));
                }
            }
        }
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Unreserved characters stay literal, everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_segment(value: &str) -> String {
    // Dot segments would be collapsed by URL normalization.
    match value {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(value, SEGMENT).to_string(),
    }
}
