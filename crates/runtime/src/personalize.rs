//! Gender-keyed text personalization.
//!
//! Pure functions over the stored preference: an ordered chain of literal
//! replacements, then an appended topic note when the *original* text
//! mentions a trigger term.  Replacement order is part of the contract —
//! each rule runs over the previous rule's output.

use istpbot_config::GenderPreference;

/// Replacement chain for male users, applied left to right.
const MALE_RULES: [(&str, &str); 4] = [
    ("ISTP는", "ISTP 남성은"),
    ("이들은", "남성 ISTP들은"),
    ("당신은", "형님은"),
    ("여러분", "형님"),
];

/// Replacement chain for female users, applied left to right.
const FEMALE_RULES: [(&str, &str); 4] = [
    ("ISTP는", "ISTP 여성은"),
    ("이들은", "여성 ISTP들은"),
    ("당신은", "언니는"),
    ("여러분", "언니"),
];

const MALE_TRIGGERS: [&str; 2] = ["직업", "커리어"];
const MALE_NOTE: &str = "\n\n💪 **남성 ISTP 특징**: 기술적 전문성과 리더십을 발휘할 수 있는 분야에서 특히 뛰어난 성과를 보이는 경우가 많아요!";

const FEMALE_TRIGGERS: [&str; 2] = ["연애", "관계"];
const FEMALE_NOTE: &str = "\n\n🌸 **여성 ISTP 특징**: 독립적이면서도 따뜻한 마음을 가진 경우가 많아, 균형 잡힌 관계를 만들어가는 능력이 뛰어나요!";

/// Rewrite `text` for the given preference.  Identity for `unset` and
/// `other`.
///
/// Not idempotent in general: when the input mentions a trigger term, every
/// application appends the topic note again (the trigger check runs against
/// the pre-replacement input, which still mentions the term).
pub fn personalize(text: &str, preference: GenderPreference) -> String {
    let (rules, triggers, note): (&[(&str, &str)], &[&str], &str) = match preference {
        GenderPreference::Male => (&MALE_RULES, &MALE_TRIGGERS, MALE_NOTE),
        GenderPreference::Female => (&FEMALE_RULES, &FEMALE_TRIGGERS, FEMALE_NOTE),
        GenderPreference::Unset | GenderPreference::Other => return text.to_string(),
    };

    let mut personalized = text.to_string();
    for (from, to) in rules {
        personalized = personalized.replace(from, to);
    }

    if triggers.iter().any(|trigger| text.contains(trigger)) {
        personalized.push_str(note);
    }

    personalized
}

/// The session greeting, with gender-specific variants.
pub fn welcome_message(preference: GenderPreference) -> &'static str {
    match preference {
        GenderPreference::Male => {
            "안녕하세요! 👋 저는 ISTP 전문 챗봇입니다.\n**논리적 실용주의자** 남성 ISTP의 특성과 강점에 대해 궁금한 것이 있으시면 언제든 물어보세요!\n\n💪 남성 ISTP만의 독특한 면모와 성장 포인트를 함께 알아봐요!"
        }
        GenderPreference::Female => {
            "안녕하세요! 👋 저는 ISTP 전문 챗봇입니다.\n**논리적 실용주의자** 여성 ISTP의 특성과 매력에 대해 궁금한 것이 있으시면 언제든 물어보세요!\n\n🌸 여성 ISTP만의 섬세한 면모와 균형 감각을 함께 탐구해봐요!"
        }
        GenderPreference::Unset | GenderPreference::Other => {
            "안녕하세요! 👋 저는 ISTP 유형 전문 챗봇입니다.\n**논리적 실용주의자** ISTP에 대해 궁금한 것이 있으시면 언제든 물어보세요!"
        }
    }
}

/// Starter questions shown at session start, with gender-specific variants.
pub fn quick_questions(preference: GenderPreference) -> [&'static str; 4] {
    match preference {
        GenderPreference::Male => [
            "남성 ISTP의 주요 특징은?",
            "남성 ISTP에게 적합한 직업은?",
            "ISTP 남성의 연애 스타일은?",
            "남성 ISTP가 리더십을 발휘하려면?",
        ],
        GenderPreference::Female => [
            "여성 ISTP의 독특한 특징은?",
            "여성 ISTP에게 어울리는 직업은?",
            "ISTP 여성의 연애와 관계 스타일은?",
            "여성 ISTP의 균형감각을 키우려면?",
        ],
        GenderPreference::Unset | GenderPreference::Other => [
            "ISTP의 주요 특징이 뭔가요?",
            "ISTP에게 어울리는 직업은?",
            "ISTP의 연애 스타일은?",
            "ISTP가 성장하려면?",
        ],
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
