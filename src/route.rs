// src/route.rs
use crate::error::AppError;
use crate::image_ref::ImageReference;
use crate::utils::{get_base_url, resource_url, strip_base};
use gloo::history::{BrowserHistory, History};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Landing,
    Upload,
    Gallery,
    Viewer(Option<ImageReference>),
    NotFound(String),
}

/// Query string of the viewer route: `?image=<encoded reference>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Route {
    pub fn viewer(reference: ImageReference) -> Self {
        Route::Viewer(Some(reference))
    }

    /// Match a base-relative path. Only the viewer looks at the query.
    pub fn recognize(path: &str, query: ViewerQuery) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/index.html" => Route::Landing,
            "/upload" => Route::Upload,
            "/gallery" => Route::Gallery,
            "/viewer" => Route::Viewer(query.image.and_then(ImageReference::parse)),
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Landing => "/",
            Route::Upload => "/upload",
            Route::Gallery => "/gallery",
            Route::Viewer(_) => "/viewer",
            Route::NotFound(path) => path,
        }
    }

    pub fn query(&self) -> ViewerQuery {
        match self {
            Route::Viewer(Some(reference)) => ViewerQuery {
                image: Some(reference.as_str().to_string()),
            },
            _ => ViewerQuery::default(),
        }
    }
}

/// Route for the browser's current location.
pub fn current_route(history: &BrowserHistory) -> Route {
    let location = history.location();
    let base = get_base_url();
    let path = strip_base(&base, location.path());
    let query = location.query::<ViewerQuery>().unwrap_or_else(|e| {
        log::warn!("Unreadable query string: {:?}", e);
        ViewerQuery::default()
    });
    Route::recognize(path, query)
}

pub fn navigate(history: &BrowserHistory, route: &Route) -> Result<(), AppError> {
    let href = resource_url(route.path());
    match route {
        Route::Viewer(Some(_)) => history
            .push_with_query(href, route.query())
            .map_err(|e| AppError::Navigation(format!("{:?}", e))),
        _ => {
            history.push(href);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadTiming;
    use crate::upload::{TickOutcome, UploadState};

    #[test]
    fn test_recognize_paths() {
        assert_eq!(Route::recognize("/", ViewerQuery::default()), Route::Landing);
        assert_eq!(Route::recognize("", ViewerQuery::default()), Route::Landing);
        assert_eq!(Route::recognize("/upload", ViewerQuery::default()), Route::Upload);
        assert_eq!(Route::recognize("/gallery/", ViewerQuery::default()), Route::Gallery);
        assert_eq!(
            Route::recognize("/nope", ViewerQuery::default()),
            Route::NotFound("/nope".to_string())
        );
    }

    #[test]
    fn test_viewer_without_image_is_a_handled_case() {
        assert_eq!(Route::recognize("/viewer", ViewerQuery::default()), Route::Viewer(None));
        let blank = ViewerQuery {
            image: Some("  ".to_string()),
        };
        assert_eq!(Route::recognize("/viewer", blank), Route::Viewer(None));
    }

    #[test]
    fn test_viewer_query_round_trip() {
        let reference = ImageReference::parse("/public/assets/hero-nebula.png").unwrap();
        let route = Route::viewer(reference.clone());
        assert_eq!(route.path(), "/viewer");
        assert_eq!(Route::recognize(route.path(), route.query()), Route::viewer(reference));
    }

    #[test]
    fn test_non_viewer_routes_carry_no_query() {
        assert_eq!(Route::Upload.query(), ViewerQuery::default());
        assert_eq!(Route::Viewer(None).query(), ViewerQuery::default());
    }

    #[test]
    fn test_landing_to_viewer_through_upload() {
        // Base64 previews carry `+`, `/` and `=`, all of which need escaping.
        let preview = "data:image/png;base64,iVBOR+w0KGgo/AAA+ANSUhEUg==".to_string();

        let mut route = Route::recognize("/", ViewerQuery::default());
        assert_eq!(route, Route::Landing);
        route = Route::Upload;

        let mut upload = UploadState::new(UploadTiming::default());
        let token = upload
            .stage("nebula.jpg".to_string(), 5 * 1024 * 1024, "image/jpeg".to_string())
            .unwrap();
        assert!(upload.preview_ready(token, preview.clone()).unwrap());
        assert_eq!(upload.candidate().unwrap().size_label(), "5.00 MB");
        upload.process().unwrap();
        while upload.tick() != TickOutcome::Finished {}
        let reference = upload.hand_off().unwrap();

        assert_eq!(route, Route::Upload);
        route = Route::viewer(reference);
        let search = serde_urlencoded::to_string(route.query()).unwrap();
        assert_eq!(
            search,
            "image=data%3Aimage%2Fpng%3Bbase64%2CiVBOR%2Bw0KGgo%2FAAA%2BANSUhEUg%3D%3D"
        );
        let query: ViewerQuery = serde_urlencoded::from_str(&search).unwrap();
        let landed = Route::recognize(route.path(), query);
        match landed {
            Route::Viewer(Some(image)) => assert_eq!(image.as_str(), preview),
            other => panic!("expected viewer route, got {:?}", other),
        }
    }
}
