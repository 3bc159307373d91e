use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bank::{Difficulty, QuestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub classifier: Classifier,
    pub quality: Quality,
    pub validator: Validator,
    pub scoring: Scoring,
    pub vocabulary: Vocabulary,
    pub flow: Flow,
    pub interview: Interview,
    pub report: Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub min_confident_chars: usize,
    pub unknown_phrases: Vec<String>,
    pub request_phrases: Vec<String>,
    pub partial_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quality {
    pub density_saturation: f32,
    pub density_weight: f32,
    pub length_saturation_words: usize,
    pub length_weight: f32,
    pub term_saturation: usize,
    pub term_weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    pub min_words: usize,
    pub min_technical_terms: usize,
    pub min_density: f32,
    pub override_confidence_base: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoring {
    pub professional_base: f32,
    pub professional_coverage_weight: f32,
    pub skill_base: f32,
    pub skill_per_term: f32,
    pub language_base: f32,
    pub language_chars_per_point: f32,
    pub logic_base: f32,
    pub logic_per_connective: f32,
    pub innovation_base: f32,
    pub innovation_per_term: f32,
    pub stress_base: f32,
    pub stress_chars_per_point: f32,
    pub plausibility: Plausibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plausibility {
    pub min_words: usize,
    pub high_average: f32,
    pub min_terms_for_high_average: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainVocabulary {
    pub name: String,
    pub aliases: Vec<String>,
    pub terms: Vec<String>,
}

impl DomainVocabulary {
    pub fn matches(&self, domain: &str) -> bool {
        let domain = domain.trim();
        self.name.eq_ignore_ascii_case(domain)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(domain))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub domains: Vec<DomainVocabulary>,
    pub default_terms: Vec<String>,
    pub technical_terms: Vec<String>,
    pub connectives: Vec<String>,
    pub innovation_terms: Vec<String>,
}

impl Vocabulary {
    pub fn resolve(&self, domain: &str) -> Option<&DomainVocabulary> {
        self.domains.iter().find(|d| d.matches(domain))
    }

    /// Canonical domain name, or the trimmed input when no table matches.
    pub fn canonical_domain(&self, domain: &str) -> String {
        self.resolve(domain)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| domain.trim().to_string())
    }

    pub fn terms_for(&self, domain: &str) -> &[String] {
        self.resolve(domain)
            .map(|d| d.terms.as_slice())
            .unwrap_or(&self.default_terms)
    }

    /// Generic technical terms plus either one domain's terms or, when the
    /// domain is absent or unknown, every domain's terms. Deduplicated, in
    /// table order.
    pub fn technical_vocabulary(&self, domain: Option<&str>) -> Vec<&str> {
        let domain_terms: Vec<&String> = match domain.and_then(|d| self.resolve(d)) {
            Some(vocab) => vocab.terms.iter().collect(),
            None => self
                .domains
                .iter()
                .flat_map(|d| d.terms.iter())
                .chain(self.default_terms.iter())
                .collect(),
        };

        let mut vocabulary: Vec<&str> = Vec::new();
        for term in self.technical_terms.iter().chain(domain_terms) {
            if !vocabulary.contains(&term.as_str()) {
                vocabulary.push(term.as_str());
            }
        }
        vocabulary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSlot {
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
}

impl FlowSlot {
    pub const fn new(question_type: QuestionType, difficulty: Difficulty) -> Self {
        Self {
            question_type,
            difficulty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSchedule {
    pub domain: String,
    pub position: String,
    pub slots: Vec<FlowSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub schedules: Vec<FlowSchedule>,
    pub default_schedule: Vec<FlowSlot>,
}

impl Flow {
    pub fn schedule(&self, domain: &str, position: &str) -> &[FlowSlot] {
        self.schedules
            .iter()
            .find(|s| s.domain == domain.trim() && s.position == position.trim())
            .map(|s| s.slots.as_slice())
            .unwrap_or(&self.default_schedule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub max_follow_ups: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub excellent: f32,
    pub good: f32,
    pub pass: f32,
    pub highlight_count: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        use Difficulty::{Easy, Hard, Medium};
        use QuestionType::{Scenario, Technical};

        Self {
            classifier: Classifier {
                min_confident_chars: 10,
                unknown_phrases: strings(&[
                    "不知道",
                    "不了解",
                    "不清楚",
                    "没听说过",
                    "不太懂",
                    "我不懂",
                    "我不会",
                    "没有接触过",
                    "没接触过",
                    "没学过",
                    "答不上来",
                    "想不起来",
                    "don't know",
                    "do not know",
                    "no idea",
                    "not familiar",
                    "never heard",
                ]),
                request_phrases: strings(&[
                    "告诉我答案",
                    "给出答案",
                    "给我答案",
                    "答案是什么",
                    "正确答案",
                    "标准答案",
                    "直接告诉我",
                    "请讲解",
                    "请解释一下",
                    "tell me the answer",
                    "what is the answer",
                    "give me the answer",
                    "show me the answer",
                ]),
                partial_phrases: strings(&[
                    "不太确定",
                    "不确定",
                    "可能是",
                    "大概是",
                    "好像是",
                    "应该是",
                    "我记得",
                    "印象中",
                    "了解一些",
                    "知道一点",
                    "略懂",
                    "只知道",
                    "不是很熟",
                    "not sure",
                    "i think",
                    "maybe",
                    "probably",
                ]),
            },
            quality: Quality {
                density_saturation: 0.05,
                density_weight: 0.5,
                length_saturation_words: 100,
                length_weight: 0.3,
                term_saturation: 5,
                term_weight: 0.2,
            },
            validator: Validator {
                min_words: 50,
                min_technical_terms: 3,
                min_density: 0.02,
                override_confidence_base: 0.6,
            },
            scoring: Scoring {
                professional_base: 50.0,
                professional_coverage_weight: 100.0,
                skill_base: 60.0,
                skill_per_term: 15.0,
                language_base: 70.0,
                language_chars_per_point: 10.0,
                logic_base: 65.0,
                logic_per_connective: 20.0,
                innovation_base: 60.0,
                innovation_per_term: 25.0,
                stress_base: 75.0,
                stress_chars_per_point: 100.0,
                plausibility: Plausibility {
                    min_words: 5,
                    high_average: 85.0,
                    min_terms_for_high_average: 3,
                },
            },
            vocabulary: Vocabulary {
                domains: vec![
                    DomainVocabulary {
                        name: "人工智能".into(),
                        aliases: strings(&["AI", "artificial intelligence"]),
                        terms: strings(&[
                            "机器学习",
                            "深度学习",
                            "神经网络",
                            "自然语言处理",
                            "计算机视觉",
                            "强化学习",
                            "卷积",
                            "transformer",
                            "梯度下降",
                            "过拟合",
                            "反向传播",
                            "注意力机制",
                        ]),
                    },
                    DomainVocabulary {
                        name: "大数据".into(),
                        aliases: strings(&["Big Data", "bigdata"]),
                        terms: strings(&[
                            "hadoop",
                            "spark",
                            "flink",
                            "kafka",
                            "hdfs",
                            "数据仓库",
                            "数据湖",
                            "分布式",
                            "mapreduce",
                            "实时计算",
                            "离线计算",
                            "etl",
                        ]),
                    },
                    DomainVocabulary {
                        name: "物联网".into(),
                        aliases: strings(&["IoT", "internet of things"]),
                        terms: strings(&[
                            "传感器",
                            "mqtt",
                            "嵌入式",
                            "边缘计算",
                            "网关",
                            "zigbee",
                            "lora",
                            "低功耗",
                            "固件",
                            "通信协议",
                            "单片机",
                            "rfid",
                        ]),
                    },
                ],
                default_terms: strings(&[
                    "数据结构",
                    "设计模式",
                    "数据库",
                    "网络协议",
                    "操作系统",
                    "并发",
                    "缓存",
                    "单元测试",
                    "微服务",
                    "版本控制",
                ]),
                technical_terms: strings(&[
                    "算法",
                    "模型",
                    "架构",
                    "系统",
                    "优化",
                    "性能",
                    "框架",
                    "接口",
                    "部署",
                    "训练",
                    "参数",
                    "数据集",
                    "api",
                    "pipeline",
                ]),
                connectives: strings(&[
                    "首先",
                    "其次",
                    "然后",
                    "接着",
                    "最后",
                    "因此",
                    "所以",
                    "因为",
                    "但是",
                    "另外",
                    "此外",
                    "总之",
                    "综上",
                    "first",
                    "then",
                    "finally",
                    "therefore",
                    "because",
                    "however",
                ]),
                innovation_terms: strings(&[
                    "创新",
                    "新颖",
                    "改进",
                    "优化",
                    "独特",
                    "突破",
                    "创造",
                    "尝试",
                    "新思路",
                    "探索",
                    "innovative",
                    "novel",
                    "improve",
                ]),
            },
            flow: Flow {
                schedules: vec![
                    FlowSchedule {
                        domain: "人工智能".into(),
                        position: "技术岗".into(),
                        slots: vec![
                            FlowSlot::new(Technical, Easy),
                            FlowSlot::new(Scenario, Medium),
                            FlowSlot::new(Technical, Medium),
                            FlowSlot::new(Scenario, Hard),
                            FlowSlot::new(Technical, Hard),
                        ],
                    },
                    FlowSchedule {
                        domain: "大数据".into(),
                        position: "技术岗".into(),
                        slots: vec![
                            FlowSlot::new(Technical, Easy),
                            FlowSlot::new(Technical, Medium),
                            FlowSlot::new(Scenario, Medium),
                            FlowSlot::new(Technical, Hard),
                            FlowSlot::new(Scenario, Hard),
                        ],
                    },
                    FlowSchedule {
                        domain: "物联网".into(),
                        position: "技术岗".into(),
                        slots: vec![
                            FlowSlot::new(Technical, Easy),
                            FlowSlot::new(Scenario, Easy),
                            FlowSlot::new(Technical, Medium),
                            FlowSlot::new(Scenario, Medium),
                            FlowSlot::new(Technical, Hard),
                        ],
                    },
                ],
                default_schedule: vec![
                    FlowSlot::new(Technical, Easy),
                    FlowSlot::new(Technical, Medium),
                    FlowSlot::new(Scenario, Medium),
                    FlowSlot::new(Technical, Hard),
                ],
            },
            interview: Interview { max_follow_ups: 1 },
            report: Report {
                excellent: 85.0,
                good: 75.0,
                pass: 60.0,
                highlight_count: 2,
            },
        }
    }
}

impl Settings {
    pub fn load() -> Settings {
        Self::load_from_files(
            Path::new("settings.default.ron"),
            Path::new("settings.ron"),
        )
    }

    pub fn load_from_files(default_path: &Path, override_path: &Path) -> Settings {
        let mut settings = read_settings(default_path).unwrap_or_default();

        if let Some(overrides) = read_settings(override_path) {
            settings = overrides;
        }

        settings
    }
}

fn read_settings(path: &Path) -> Option<Settings> {
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read settings file");
            return None;
        }
    };

    match ron::from_str::<Settings>(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings file, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_domain_aliases() {
        let s = Settings::default();
        assert_eq!(s.vocabulary.canonical_domain("AI"), "人工智能");
        assert_eq!(s.vocabulary.canonical_domain("big data"), "大数据");
        assert_eq!(s.vocabulary.canonical_domain(" IoT "), "物联网");
        assert_eq!(s.vocabulary.canonical_domain("区块链"), "区块链");
    }

    #[test]
    fn test_unknown_domain_uses_default_terms() {
        let s = Settings::default();
        assert_eq!(s.vocabulary.terms_for("区块链"), s.vocabulary.default_terms.as_slice());
        assert!(s.vocabulary.terms_for("人工智能").contains(&"深度学习".to_string()));
    }

    #[test]
    fn test_technical_vocabulary_deduplicated() {
        let s = Settings::default();
        let all = s.vocabulary.technical_vocabulary(None);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());

        let ai = s.vocabulary.technical_vocabulary(Some("AI"));
        assert!(ai.contains(&"神经网络"));
        assert!(!ai.contains(&"kafka"));
    }

    #[test]
    fn test_schedule_fallback() {
        let s = Settings::default();
        assert_eq!(s.flow.schedule("人工智能", "技术岗").len(), 5);
        assert_eq!(
            s.flow.schedule("区块链", "技术岗"),
            s.flow.default_schedule.as_slice()
        );
    }

    #[test]
    fn test_settings_ron_roundtrip_and_missing_files() {
        let s = Settings::default();
        let text = ron::to_string(&s).unwrap();
        let parsed: Settings = ron::from_str(&text).unwrap();
        assert_eq!(parsed.flow.default_schedule, s.flow.default_schedule);

        let loaded = Settings::load_from_files(
            Path::new("does-not-exist.default.ron"),
            Path::new("does-not-exist.ron"),
        );
        assert_eq!(loaded.validator.min_words, s.validator.min_words);
    }
}
