/// Request-level options parsed from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BriefingRequest {
    /// `None` selects every configured resource.
    pub resources: Option<Vec<String>>,
    pub period: Option<String>,
    /// Only positive integers survive parsing.
    pub latest: Option<usize>,
}

impl BriefingRequest {
    /// Parses `resources=a,b&period=30d&latest=5`. Malformed values are
    /// dropped rather than rejected; the last occurrence of a key wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut request = Self::default();
        let Some(query) = query else {
            return request;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "resources" => {
                    request.resources = Some(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|k| !k.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "period" => {
                    let value = value.trim();
                    request.period = (!value.is_empty()).then(|| value.to_string());
                }
                "latest" => {
                    request.latest = value.trim().parse::<usize>().ok().filter(|n| *n > 0);
                }
                _ => {}
            }
        }
        request
    }
}
