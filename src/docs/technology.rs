//! Technology inventory derived from import names.

use std::collections::BTreeSet;

/// Substring, display label, description
const TECHNOLOGIES: &[(&str, &str, &str)] = &[
    ("express", "Express", "Web framework for Node.js"),
    ("django", "Django", "Web framework for Python"),
    ("fastapi", "Fastapi", "Modern framework for building APIs in Python"),
    ("flask", "Flask", "Micro web framework for Python"),
    ("react", "React", "JavaScript library for building user interfaces"),
    ("vue", "Vue", "JavaScript framework for user interfaces"),
    ("angular", "Angular", "Full framework for web applications"),
    ("sqlalchemy", "Sqlalchemy", "ORM for Python"),
    ("mongoose", "Mongoose", "MongoDB ODM for Node.js"),
    ("postgresql", "Postgresql", "Relational database"),
    ("mongodb", "Mongodb", "NoSQL database"),
    ("redis", "Redis", "In-memory data store"),
    ("numpy", "Numpy", "Numerical computing library for Python"),
    ("pandas", "Pandas", "Data analysis library for Python"),
    ("scikit", "Scikit", "Machine learning in Python"),
    ("tensorflow", "Tensorflow", "Machine learning framework"),
    ("pytorch", "Pytorch", "Deep learning framework"),
];

const FALLBACK: Technology = Technology {
    label: "Python/JavaScript",
    description: "Programming language",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Technology {
    pub label: &'static str,
    pub description: &'static str,
}

/// Detected technologies in table order, without duplicates.
///
/// Each import contributes at most its first matching table entry.
/// Returns the generic fallback when nothing matches.
pub fn detect(imports: &BTreeSet<String>) -> Vec<Technology> {
    let mut hits = vec![false; TECHNOLOGIES.len()];

    for import in imports {
        let lowered = import.to_lowercase();
        if let Some(index) = TECHNOLOGIES
            .iter()
            .position(|(needle, _, _)| lowered.contains(needle))
        {
            hits[index] = true;
        }
    }

    let detected: Vec<Technology> = TECHNOLOGIES
        .iter()
        .zip(hits)
        .filter(|(_, hit)| *hit)
        .map(|(&(_, label, description), _)| Technology { label, description })
        .collect();

    if detected.is_empty() {
        vec![FALLBACK]
    } else {
        detected
    }
}
