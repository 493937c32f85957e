use serde::Serialize;

/// Connection metadata safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

impl std::fmt::Display for RedactedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted)
    }
}

/// Mask the password and secret query parameters of a `DATABASE_URL`.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some((scheme, rest)) = conn.split_once("://") else {
        return RedactedConnection {
            engine: None,
            user: None,
            host: None,
            port: None,
            database: None,
            redacted: "***".to_string(),
        };
    };

    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (auth, address) = match location.rsplit_once('@') {
        Some((auth, address)) => (Some(auth), address),
        None => (None, location),
    };
    let (host_port, database) = match address.split_once('/') {
        Some((host_port, database)) => (host_port, Some(database)),
        None => (address, None),
    };

    let user = auth.map(|auth| auth.split_once(':').map_or(auth, |(user, _)| user));
    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()),
        None => (host_port, None),
    };

    let mut redacted = format!("{scheme}://");
    if let Some(auth) = auth {
        match auth.split_once(':') {
            Some((user, _)) => redacted.push_str(&format!("{user}:***@")),
            None => redacted.push_str(&format!("{auth}@")),
        }
    }
    redacted.push_str(address);
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&redact_query(query));
    }

    RedactedConnection {
        engine: Some(scheme.to_string()),
        user: user.filter(|user| !user.is_empty()).map(str::to_string),
        host: Some(host.to_string()).filter(|host| !host.is_empty()),
        port,
        database: database.filter(|db| !db.is_empty()).map(str::to_string),
        redacted,
    }
}

fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "token" | "api_key" | "apikey" | "sslpassword"
    )
}
