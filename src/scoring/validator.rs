use serde::{Deserialize, Serialize};

use super::classification::ResponseCategory;
use super::quality::{analyze_quality_for, QualityReport};
use crate::settings::Settings;

pub const PASS_THROUGH_CONFIDENCE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub potential_misjudgment: bool,
    pub final_classification: ResponseCategory,
    pub confidence: f32,
    pub quality: QualityReport,
}

/// Single corrective pass over an initial classification. Only
/// `ExpressUnknown` can be overridden, and only by long, term-dense text.
pub fn validate(
    text: &str,
    initial: ResponseCategory,
    domain: &str,
    settings: &Settings,
) -> ValidationOutcome {
    let quality = analyze_quality_for(text, domain, &settings.vocabulary, &settings.quality);
    let v = &settings.validator;

    let contradicted = initial == ResponseCategory::ExpressUnknown
        && quality.word_count > v.min_words
        && quality.technical_terms.len() >= v.min_technical_terms
        && quality.technical_density >= v.min_density;

    if contradicted {
        let base = v.override_confidence_base.clamp(0.0, 1.0);
        let confidence = (base + (1.0 - base) * quality.confidence_score).clamp(0.0, 1.0);
        ValidationOutcome {
            potential_misjudgment: true,
            final_classification: ResponseCategory::ConfidentAnswer,
            confidence,
            quality,
        }
    } else {
        ValidationOutcome {
            potential_misjudgment: false,
            final_classification: initial,
            confidence: PASS_THROUGH_CONFIDENCE,
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classification::classify;
    use crate::scoring::vocabulary::word_count;

    const LONG_TECHNICAL_ANSWER: &str = "这个问题我不知道标准说法，但我在项目里做过：\
        我们用深度学习搭建了卷积神经网络做图像分类，先用机器学习的方法做特征基线，\
        再用反向传播和梯度下降训练模型，并通过数据增强和正则化缓解过拟合，\
        最后部署到线上并持续监控性能。";

    #[test]
    fn test_long_technical_answer_is_corrected() {
        let s = Settings::default();
        assert!(word_count(LONG_TECHNICAL_ANSWER) > 50);

        let initial = classify(LONG_TECHNICAL_ANSWER, &s.classifier);
        assert_eq!(initial.category, ResponseCategory::ExpressUnknown);

        let outcome = validate(LONG_TECHNICAL_ANSWER, initial.category, "人工智能", &s);
        assert!(outcome.potential_misjudgment);
        assert_eq!(
            outcome.final_classification,
            ResponseCategory::ConfidentAnswer
        );
        assert!(outcome.confidence > 0.7);
        assert!(outcome.confidence <= 1.0);
    }

    #[test]
    fn test_long_narrative_with_three_terms_is_corrected() {
        let s = Settings::default();
        let text = "这个公式的推导我不知道，不过我可以讲讲我们团队去年做的项目。\
            当时业务方希望提前发现有问题的订单，我们先用机器学习的方法整理了一版基础方案，\
            效果一般，后来改成深度学习的方案，搭了一个不算很大的神经网络。\
            上线之前我们和业务同事一起反复核对结果，把误报比较多的情况逐条记录下来，\
            每周开会复盘，再根据反馈调整规则和阈值。整个过程大概持续了三个月，\
            最后误报率明显下降，业务方也比较满意，这段经历让我学到了很多。";
        assert!(word_count(text) > 150);

        let initial = classify(text, &s.classifier);
        assert_eq!(initial.category, ResponseCategory::ExpressUnknown);

        let outcome = validate(text, initial.category, "人工智能", &s);
        assert_eq!(
            outcome.quality.technical_terms,
            vec!["机器学习", "深度学习", "神经网络"]
        );
        assert!(outcome.potential_misjudgment);
        assert_eq!(
            outcome.final_classification,
            ResponseCategory::ConfidentAnswer
        );
        assert!(outcome.confidence > 0.7);
    }

    #[test]
    fn test_short_unknown_passes_through() {
        let s = Settings::default();
        let outcome = validate("我不知道", ResponseCategory::ExpressUnknown, "人工智能", &s);
        assert!(!outcome.potential_misjudgment);
        assert_eq!(outcome.final_classification, ResponseCategory::ExpressUnknown);
        assert_eq!(outcome.confidence, PASS_THROUGH_CONFIDENCE);
    }

    #[test]
    fn test_long_non_technical_unknown_passes_through() {
        let s = Settings::default();
        let text = "我不知道，".to_string() + &"这个问题我真的没有想过，也没有相关的经历可以分享。".repeat(4);
        assert!(word_count(&text) > 50);
        let outcome = validate(&text, ResponseCategory::ExpressUnknown, "人工智能", &s);
        assert!(!outcome.potential_misjudgment);
        assert_eq!(outcome.final_classification, ResponseCategory::ExpressUnknown);
    }

    #[test]
    fn test_other_categories_never_overridden() {
        let s = Settings::default();
        for category in [
            ResponseCategory::ConfidentAnswer,
            ResponseCategory::PartialKnowledge,
            ResponseCategory::RequestAnswer,
        ] {
            let outcome = validate(LONG_TECHNICAL_ANSWER, category, "人工智能", &s);
            assert!(!outcome.potential_misjudgment);
            assert_eq!(outcome.final_classification, category);
            assert_eq!(outcome.confidence, PASS_THROUGH_CONFIDENCE);
        }
    }
}
