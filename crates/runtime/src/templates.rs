//! Deterministic local response builders, one per category.
//!
//! Each builder composes its text from the knowledge base; the raw
//! question is echoed where the category is the catch-all default.

use istpbot_knowledge::{Category, KNOWLEDGE};

/// Build the canned response for `category`.
pub fn local_response(category: Category, input: &str) -> String {
    match category {
        Category::Basic => basic(input),
        Category::Cognitive => cognitive(),
        Category::Career => career(),
        Category::Relationship => relationship(),
        Category::Growth => growth(),
        Category::Compatibility => compatibility(),
        Category::Stress => stress(),
    }
}

fn bullets(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn basic(input: &str) -> String {
    let traits = &KNOWLEDGE.characteristics.strengths[..3];
    let trait_lines = traits
        .iter()
        .map(|t| format!("• **{}**: {}", t.title, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let echo = if input.trim().is_empty() {
        String::new()
    } else {
        format!("귀하의 질문을 받았습니다: \"{}\"\n\n", input.trim())
    };

    format!(
        "안녕하세요! 🔧 ISTP의 주요 특징에 대해 설명드릴게요.\n\n{echo}**ISTP(논리적 실용주의자)의 핵심 특징:**\n\n{trait_lines}\n\nISTP는 \"만능 수리공\"이라는 별명처럼 **실용적 문제 해결**에 탁월한 능력을 보입니다. 이론보다는 직접 해보면서 배우는 것을 선호하고, 논리적 분석을 통해 효율적인 해결책을 찾아내는 것이 특기죠! ⚙️\n\n더 궁금한 부분이 있으시면 언제든 물어보세요! 😊"
    )
}

fn cognitive() -> String {
    let funcs = &KNOWLEDGE.cognitive_functions;
    format!(
        "🧠 **ISTP의 인지기능**에 대해 설명드릴게요!\n\n**주기능 - {p_code} ({p_name})** 🎯\n{p_desc}\n- {p0}\n- {p1}\n\n**보조기능 - {a_code} ({a_name})** ⚡\n{a_desc}\n- {a0}\n- {a1}\n\n**3차기능 - {t_code} ({t_name})** 🔮\n{t_desc}\n\n**열등기능 - {i_code} ({i_name})** 💭\n{i_desc}\n\nTi와 Se의 조합이 ISTP만의 독특한 **\"분석 후 즉시 실행\"** 스타일을 만들어냅니다! 🚀",
        p_code = funcs.primary.code,
        p_name = funcs.primary.name,
        p_desc = funcs.primary.description,
        p0 = funcs.primary.characteristics[0],
        p1 = funcs.primary.characteristics[1],
        a_code = funcs.auxiliary.code,
        a_name = funcs.auxiliary.name,
        a_desc = funcs.auxiliary.description,
        a0 = funcs.auxiliary.characteristics[0],
        a1 = funcs.auxiliary.characteristics[1],
        t_code = funcs.tertiary.code,
        t_name = funcs.tertiary.name,
        t_desc = funcs.tertiary.description,
        i_code = funcs.inferior.code,
        i_name = funcs.inferior.name,
        i_desc = funcs.inferior.description,
    )
}

fn career() -> String {
    let fields = &KNOWLEDGE.career.suitable_fields[..2];
    let field_blocks = fields
        .iter()
        .map(|field| {
            format!(
                "**{}** 🎯\n{}",
                field.category,
                bullets(&field.jobs[..3])
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let env = bullets(&KNOWLEDGE.career.work_environment_preferences[..3]);

    format!(
        "💼 **ISTP에게 어울리는 직업**을 추천해드릴게요!\n\n{field_blocks}\n\n**ISTP가 선호하는 업무 환경:**\n{env}\n\nISTP는 **\"손으로 만들고, 머리로 분석하는\"** 일에서 최고의 능력을 발휘합니다! 🛠️\n\n특정 분야에 대해 더 자세히 알고 싶으시면 말씀해주세요! 😊"
    )
}

fn relationship() -> String {
    let love = &KNOWLEDGE.relationships.love_style;
    format!(
        "💕 **ISTP의 연애 스타일**에 대해 말씀드릴게요!\n\n**ISTP의 사랑 표현법:**\n{expressions}\n\n**연애에서의 특징:**\n- 말보다는 **행동으로 사랑을 증명** 🛠️\n- 연인의 문제를 실질적으로 해결해주려 함\n- 독립적인 관계를 추구하며 서로의 공간 존중\n\n**주의할 점:**\n{challenges}\n\n**개선 팁:**\n{tips}\n\nISTP는 **\"조용하지만 든든한 파트너\"** 스타일이에요! 💪",
        expressions = bullets(&love.characteristics[..3]),
        challenges = bullets(&love.challenges[..2]),
        tips = bullets(&love.tips[..2]),
    )
}

fn growth() -> String {
    let areas = &KNOWLEDGE.growth.development_areas[..2];
    let area_blocks = areas
        .iter()
        .map(|area| format!("**{}** 🎯\n{}", area.area, bullets(&area.methods[..2])))
        .collect::<Vec<_>>()
        .join("\n\n");
    let coping = bullets(&KNOWLEDGE.growth.stress_management.coping_strategies[..2]);

    format!(
        "🌱 **ISTP의 성장 방향**을 제시해드릴게요!\n\n{area_blocks}\n\n**스트레스 관리법:**\n{coping}\n\nISTP는 자신의 **논리적 분석 능력**을 바탕으로 꾸준한 자기계발이 가능한 유형입니다! 💪\n\n단계별로 천천히 발전해나가는 것이 핵심이에요! 🚀"
    )
}

fn compatibility() -> String {
    let compat = &KNOWLEDGE.relationships.compatibility;
    let best = compat.best[..2]
        .iter()
        .map(|m| format!("• **{}**: {}", m.type_code, m.reason))
        .collect::<Vec<_>>()
        .join("\n");
    let challenging = compat.challenging[..1]
        .iter()
        .map(|m| format!("• **{}**: {}", m.type_code, m.reason))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🤝 **ISTP와 잘 맞는 MBTI 유형**을 알려드릴게요!\n\n**최고 궁합 💕**\n{best}\n\n**도전적인 관계 ⚠️**\n{challenging}\n\n**ISTP와의 관계에서 중요한 것:**\n• 서로의 독립성 존중 🔄\n• 논리적 소통과 감정적 이해의 균형 ⚖️\n• 실질적 도움과 지원 💪\n\n궁합은 참고사항일 뿐, **서로를 이해하려는 노력**이 가장 중요해요! 😊"
    )
}

fn stress() -> String {
    let info = &KNOWLEDGE.growth.stress_management;
    format!(
        "😰 **ISTP의 스트레스 관리**에 대해 알려드릴게요!\n\n**스트레스 요인:**\n{triggers}\n\n**효과적인 대처법:**\n{coping}\n\n**ISTP 스트레스 신호:**\n• 평소보다 감정적으로 변함 😤\n• 타인을 피하고 혼자 있으려 함 🏠\n• 비판적이고 냉소적으로 변함 😑\n\n**회복 방법:**\n1. **혼자만의 시간** 충분히 갖기 ⏰\n2. **물리적 활동**으로 에너지 방출 🏃\n3. **구체적 문제 해결**에 집중하기 🎯\n\nISTP에게는 **\"혼자 재충전하는 시간\"**이 꼭 필요해요! 🔋",
        triggers = bullets(&info.stress_triggers[..3]),
        coping = bullets(&info.coping_strategies[..3]),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
