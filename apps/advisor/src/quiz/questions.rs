use serde::Serialize;

/// Steps of the default wizard, 1-based.
pub const STEP_DEMOGRAPHICS: usize = 1;
pub const STEP_QUIZ: usize = 2;
pub const STEP_CONSTRAINTS: usize = 3;
pub const STEP_REVIEW: usize = 4;
pub const TOTAL_STEPS: usize = 4;

const FREQUENCY: &[(&str, &str)] = &[
    ("always", "Always"),
    ("sometimes", "Sometimes"),
    ("rarely", "Rarely"),
    ("never", "Never"),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
    /// Overrides the question's tags when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub step: usize,
    pub prompt: String,
    pub tags: Vec<String>,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Tags credited when `value` is chosen: the option's own tags if it has any,
    /// otherwise the question's.
    pub fn tags_for(&self, value: &str) -> &[String] {
        match self.option(value) {
            Some(opt) if !opt.tags.is_empty() => &opt.tags,
            _ => &self.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn required_ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(vec![
            frequency_question(
                "q_lab_work",
                "I enjoy doing experiments in a science lab.",
                &["lab", "practical"],
            ),
            frequency_question(
                "q_puzzles",
                "I like solving maths puzzles and logical problems.",
                &["maths", "analytical"],
            ),
            frequency_question(
                "q_debate",
                "I enjoy debates, public speaking or explaining things to others.",
                &["communication"],
            ),
            frequency_question(
                "q_creative",
                "I spend free time drawing, writing or making music.",
                &["arts", "creative"],
            ),
            frequency_question(
                "q_business_news",
                "I follow business news or like the idea of running a shop.",
                &["business", "entrepreneurship"],
            ),
            frequency_question(
                "q_money",
                "I am comfortable keeping accounts and working with money.",
                &["commerce", "finance"],
            ),
            frequency_question(
                "q_gadgets",
                "I like opening up gadgets to see how they work.",
                &["practical", "technical"],
            ),
            Question {
                id: "q_favourite_subject".to_string(),
                step: STEP_QUIZ,
                prompt: "Which subject do you enjoy the most?".to_string(),
                tags: Vec::new(),
                options: vec![
                    tagged_option("physics", "Physics", &["lab", "analytical"]),
                    tagged_option("mathematics", "Mathematics", &["maths"]),
                    tagged_option("biology", "Biology", &["lab"]),
                    tagged_option("history", "History", &["arts"]),
                    tagged_option("languages", "Languages", &["communication", "arts"]),
                    tagged_option("economics", "Economics", &["commerce", "business"]),
                ],
            },
            Question {
                id: "q_maths_confidence".to_string(),
                step: STEP_QUIZ,
                prompt: "How confident are you in maths, from 1 to 5?".to_string(),
                tags: vec!["maths".to_string()],
                options: (1..=5)
                    .map(|n| tagged_option(&n.to_string(), &n.to_string(), &[]))
                    .collect(),
            },
        ])
    }
}

fn frequency_question(id: &str, prompt: &str, tags: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        step: STEP_QUIZ,
        prompt: prompt.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        options: FREQUENCY
            .iter()
            .map(|(value, label)| tagged_option(value, label, &[]))
            .collect(),
    }
}

fn tagged_option(value: &str, label: &str, tags: &[&str]) -> QuestionOption {
    QuestionOption {
        value: value.to_string(),
        label: label.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
