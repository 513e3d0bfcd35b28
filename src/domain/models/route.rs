use http::Method;

/// The three request treatments the portal knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    UploadAuth,
    Listing,
    DownloadPassthrough,
}

impl RouteClass {
    /// Methods accepted for this class
    pub fn allowed_methods(&self) -> Vec<Method> {
        match self {
            RouteClass::UploadAuth => vec![Method::GET],
            RouteClass::Listing | RouteClass::DownloadPassthrough => {
                vec![Method::GET, Method::HEAD]
            }
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods().contains(method)
    }

    /// Value for an `Allow` header
    pub fn allow_header(&self) -> String {
        self.allowed_methods()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RouteClass::UploadAuth => "upload-authorization",
            RouteClass::Listing => "listing",
            RouteClass::DownloadPassthrough => "download",
        };
        write!(f, "{}", name)
    }
}

/// What the edge is told it may do with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDirective {
    NoStore,
    Optimized { max_age_secs: u64 },
}

impl CacheDirective {
    pub fn header_value(&self) -> String {
        match self {
            CacheDirective::NoStore => "no-store".to_string(),
            CacheDirective::Optimized { max_age_secs } => {
                format!("public, max-age={}", max_age_secs)
            }
        }
    }
}
