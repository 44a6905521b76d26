//! Static driver configuration

use crate::release::types::{ReleaseFilter, RepoRef};

/// A database client driver tracked by the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSpec {
    /// Unique id, also the key into the supported-version table
    pub name: String,
    pub description: String,
    /// ScyllaDB-maintained repository
    pub scylla_repo: RepoRef,
    /// Upstream Apache/DataStax repository; None for Scylla-specific drivers
    pub cassandra_repo: Option<RepoRef>,
    /// Literal tag prefix selecting one major-version line (e.g. "3.")
    pub version_prefix: Option<String>,
    pub include_prereleases: bool,
}

impl DriverSpec {
    pub fn new(name: &str, description: &str, scylla_repo: RepoRef) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            scylla_repo,
            cassandra_repo: None,
            version_prefix: None,
            include_prereleases: false,
        }
    }

    pub fn with_upstream(mut self, repo: RepoRef) -> Self {
        self.cassandra_repo = Some(repo);
        self
    }

    pub fn with_version_prefix(mut self, prefix: &str) -> Self {
        self.version_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_prereleases(mut self) -> Self {
        self.include_prereleases = true;
        self
    }

    pub fn has_upstream(&self) -> bool {
        self.cassandra_repo.is_some()
    }

    /// Filter applied to both the Scylla and the upstream repository
    pub fn filter(&self) -> ReleaseFilter {
        ReleaseFilter {
            version_prefix: self.version_prefix.clone(),
            include_prereleases: self.include_prereleases,
        }
    }
}

/// The drivers tracked by default
pub fn default_drivers() -> Vec<DriverSpec> {
    vec![
        DriverSpec::new(
            "scylla-rust-driver",
            "Rust CQL driver",
            RepoRef::new("scylladb", "scylla-rust-driver"),
        ),
        DriverSpec::new("gocql", "Go CQL driver", RepoRef::new("scylladb", "gocql"))
            .with_upstream(RepoRef::new("gocql", "gocql")),
        DriverSpec::new(
            "cpp-driver",
            "C++ Cassandra driver",
            RepoRef::new("scylladb", "cpp-driver"),
        )
        .with_upstream(RepoRef::new("apache", "cassandra-cpp-driver")),
        DriverSpec::new(
            "java-driver-3x",
            "Java Cassandra driver 3.x",
            RepoRef::new("scylladb", "java-driver"),
        )
        .with_upstream(RepoRef::new("apache", "cassandra-java-driver"))
        .with_version_prefix("3."),
        DriverSpec::new(
            "java-driver-4x",
            "Java Cassandra driver 4.x",
            RepoRef::new("scylladb", "java-driver"),
        )
        .with_upstream(RepoRef::new("apache", "cassandra-java-driver"))
        .with_version_prefix("4."),
        DriverSpec::new(
            "python-driver",
            "Python Cassandra driver",
            RepoRef::new("scylladb", "python-driver"),
        )
        .with_upstream(RepoRef::new("apache", "cassandra-python-driver")),
        DriverSpec::new(
            "cpp-rs-driver",
            "C++ Rust-style driver",
            RepoRef::new("scylladb", "cpp-rs-driver"),
        ),
        DriverSpec::new(
            "csharp-driver",
            "C# Cassandra driver",
            RepoRef::new("scylladb", "csharp-driver"),
        )
        .with_upstream(RepoRef::new("datastax", "csharp-driver")),
        DriverSpec::new(
            "nodejs-rs-driver",
            "Node.js Rust-style driver",
            RepoRef::new("scylladb", "nodejs-rs-driver"),
        )
        .with_prereleases(),
    ]
}
