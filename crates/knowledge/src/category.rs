use serde::{Deserialize, Serialize};

/// Closed set of topics a user question can be filed under.
///
/// Declaration order is the matching priority order: when a question
/// contains keywords from several categories, the earliest declared
/// category wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    Cognitive,
    Career,
    Relationship,
    Growth,
    Compatibility,
    Stress,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Basic,
        Category::Cognitive,
        Category::Career,
        Category::Relationship,
        Category::Growth,
        Category::Compatibility,
        Category::Stress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Cognitive => "cognitive",
            Category::Career => "career",
            Category::Relationship => "relationship",
            Category::Growth => "growth",
            Category::Compatibility => "compatibility",
            Category::Stress => "stress",
        }
    }
}

/// Lowercase keywords per category, in matching priority order.
const KEYWORD_TABLE: [(Category, &[&str]); 7] = [
    (
        Category::Basic,
        &["istp", "특징", "성격", "어떤", "설명"],
    ),
    (
        Category::Cognitive,
        &["인지기능", "ti", "se", "ni", "fe", "기능"],
    ),
    (
        Category::Career,
        &["직업", "일", "업무", "진로", "취업", "커리어"],
    ),
    (
        Category::Relationship,
        &["연애", "사랑", "연인", "관계", "데이트"],
    ),
    (
        Category::Growth,
        &["성장", "발전", "개발", "발달", "향상"],
    ),
    (
        Category::Compatibility,
        &["궁합", "어울리는", "맞는", "mbti"],
    ),
    (
        Category::Stress,
        &["스트레스", "힘들", "어려운", "관리", "해결"],
    ),
];

/// The keyword set for one category.
pub fn keywords(category: Category) -> &'static [&'static str] {
    KEYWORD_TABLE
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Map free text to a category by lowercase substring containment.
///
/// Total: anything that matches no keyword — including the empty string —
/// is `basic`.
pub fn categorize(input: &str) -> Category {
    let lowered = input.to_lowercase();
    for (category, words) in KEYWORD_TABLE {
        for word in words {
            if lowered.contains(word) {
                return category;
            }
        }
    }
    Category::Basic
}

// ── Tests ────────────────────────────────────────────────────────────────────
