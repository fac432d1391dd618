//! Interview domain catalog. Only these domains can start a test.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InterviewDomain {
    pub domain: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const DOMAINS: &[InterviewDomain] = &[
    InterviewDomain {
        domain: "frontend",
        label: "Frontend Developer",
        description: "HTML, CSS, JavaScript, React, and UI/UX concepts",
    },
    InterviewDomain {
        domain: "backend",
        label: "Backend Developer",
        description: "Node.js, APIs, databases, and server-side concepts",
    },
    InterviewDomain {
        domain: "fullstack",
        label: "Full Stack Developer",
        description: "End-to-end development, architecture, and integration",
    },
    InterviewDomain {
        domain: "data-science",
        label: "Data Scientist",
        description: "Machine learning, statistics, and data analysis",
    },
    InterviewDomain {
        domain: "devops",
        label: "DevOps Engineer",
        description: "CI/CD, containers, cloud, and infrastructure",
    },
];

pub fn find_domain(domain: &str) -> Option<&'static InterviewDomain> {
    DOMAINS.iter().find(|d| d.domain == domain)
}

/// Human-readable label for a domain id, falling back to the id itself.
pub fn domain_label(domain: &str) -> String {
    find_domain(domain)
        .map(|d| d.label.to_string())
        .unwrap_or_else(|| domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_domain() {
        let d = find_domain("data-science").unwrap();
        assert_eq!(d.label, "Data Scientist");
    }

    #[test]
    fn test_unknown_domain_label_falls_back_to_id() {
        assert!(find_domain("marketing").is_none());
        assert_eq!(domain_label("marketing"), "marketing");
    }

    #[test]
    fn test_domain_ids_are_unique() {
        for (i, a) in DOMAINS.iter().enumerate() {
            for b in &DOMAINS[i + 1..] {
                assert_ne!(a.domain, b.domain);
            }
        }
    }
}
