use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[strum(serialize = "technical")]
    Technical,
    #[strum(serialize = "scenario")]
    Scenario,
    #[strum(serialize = "behavioral")]
    Behavioral,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[strum(serialize = "easy")]
    Easy,
    #[strum(serialize = "medium")]
    Medium,
    #[strum(serialize = "hard")]
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub expected_points: Vec<String>,
}

impl Question {
    pub fn new(
        text: &str,
        question_type: QuestionType,
        difficulty: Difficulty,
        keywords: &[&str],
        expected_points: &[&str],
    ) -> Self {
        Self {
            text: text.to_string(),
            difficulty,
            question_type,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            expected_points: expected_points.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Questions keyed by domain, then position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    domains: BTreeMap<String, BTreeMap<String, Vec<Question>>>,
}

impl QuestionBank {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading question bank {}", path.display()))?;
        let bank: QuestionBank = ron::from_str(&content)
            .with_context(|| format!("parsing question bank {}", path.display()))?;
        Ok(bank)
    }

    pub fn insert(&mut self, domain: &str, position: &str, question: Question) {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .entry(position.to_string())
            .or_default()
            .push(question);
    }

    pub fn len(&self) -> usize {
        self.all().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn questions(&self, domain: &str, position: &str) -> &[Question] {
        self.domains
            .get(domain)
            .and_then(|positions| positions.get(position))
            .map(|qs| qs.as_slice())
            .unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &Question> {
        self.domains.values().flat_map(|p| p.values()).flatten()
    }

    /// Candidate questions for an interview: the exact position, else every
    /// position in the domain, else the whole bank.
    pub fn pool(&self, domain: &str, position: &str) -> Vec<&Question> {
        let exact = self.questions(domain, position);
        if !exact.is_empty() {
            return exact.iter().collect();
        }

        let by_domain: Vec<&Question> = self
            .domains
            .get(domain)
            .into_iter()
            .flat_map(|positions| positions.values())
            .flatten()
            .collect();
        if !by_domain.is_empty() {
            return by_domain;
        }

        self.all().collect()
    }

    pub fn builtin() -> Self {
        use Difficulty::{Easy, Hard, Medium};
        use QuestionType::{Behavioral, Scenario, Technical};

        let mut bank = QuestionBank::default();

        let ai = [
            Question::new(
                "请解释机器学习中的过拟合现象，以及常见的缓解方法。",
                Technical,
                Easy,
                &["过拟合", "正则化", "验证集"],
                &["模型在训练集表现好而在测试集表现差", "正则化、早停、数据增强", "交叉验证"],
            ),
            Question::new(
                "监督学习和无监督学习有什么区别？各举一个例子。",
                Technical,
                Easy,
                &["监督学习", "无监督学习", "标签"],
                &["是否有标签", "分类/回归与聚类/降维的例子"],
            ),
            Question::new(
                "请说明反向传播算法的基本原理。",
                Technical,
                Medium,
                &["反向传播", "梯度", "链式法则"],
                &["链式法则逐层计算梯度", "根据梯度更新参数"],
            ),
            Question::new(
                "Transformer 中的注意力机制是如何工作的？",
                Technical,
                Medium,
                &["注意力机制", "query", "key", "value"],
                &["Q/K/V 计算相似度", "softmax 加权求和", "多头注意力"],
            ),
            Question::new(
                "如何在资源受限的设备上部署一个大型深度学习模型？",
                Technical,
                Hard,
                &["量化", "剪枝", "蒸馏"],
                &["模型量化", "剪枝", "知识蒸馏", "推理框架优化"],
            ),
            Question::new(
                "请分析梯度消失和梯度爆炸的成因及解决方案。",
                Technical,
                Hard,
                &["梯度消失", "梯度爆炸", "残差"],
                &["链式乘积导致梯度指数变化", "合适的初始化与激活函数", "残差连接与梯度裁剪"],
            ),
            Question::new(
                "线上推荐模型的点击率突然下降，你会如何排查？",
                Scenario,
                Medium,
                &["数据分布", "监控", "回滚"],
                &["检查数据与特征管道", "对比线上线下指标", "必要时回滚模型"],
            ),
            Question::new(
                "业务方希望用少量标注数据训练一个文本分类模型，你会怎么做？",
                Scenario,
                Medium,
                &["预训练模型", "微调", "数据增强"],
                &["使用预训练模型微调", "数据增强与主动学习", "合理评估指标"],
            ),
            Question::new(
                "请设计一个支持千万级用户的智能客服系统的整体架构。",
                Scenario,
                Hard,
                &["架构", "意图识别", "扩展性"],
                &["意图识别与对话管理", "检索与生成结合", "水平扩展与缓存"],
            ),
            Question::new(
                "模型在不同人群上的效果差异明显，如何发现并缓解这种偏差？",
                Scenario,
                Hard,
                &["公平性", "偏差", "评估"],
                &["分组评估指标", "数据重采样或重加权", "持续监控"],
            ),
        ];
        for q in ai {
            bank.insert("人工智能", "技术岗", q);
        }

        bank.insert(
            "人工智能",
            "产品岗",
            Question::new(
                "你如何评估一个 AI 功能是否值得上线？",
                Behavioral,
                Medium,
                &["指标", "用户价值", "成本"],
                &["明确业务指标", "用户价值与风险", "成本收益分析"],
            ),
        );

        let big_data = [
            Question::new(
                "HDFS 的读写流程是怎样的？",
                Technical,
                Easy,
                &["hdfs", "namenode", "datanode"],
                &["NameNode 管理元数据", "DataNode 存储数据块", "副本机制"],
            ),
            Question::new(
                "Spark 中 RDD 的宽依赖和窄依赖有什么区别？",
                Technical,
                Medium,
                &["spark", "rdd", "shuffle"],
                &["窄依赖一对一", "宽依赖需要 shuffle", "影响 stage 划分"],
            ),
            Question::new(
                "如何处理 Spark 作业中的数据倾斜？",
                Technical,
                Hard,
                &["数据倾斜", "加盐", "聚合"],
                &["定位倾斜 key", "加盐打散", "两阶段聚合"],
            ),
            Question::new(
                "设计一个实时统计网站 PV/UV 的方案。",
                Scenario,
                Medium,
                &["kafka", "flink", "去重"],
                &["Kafka 采集", "Flink 窗口计算", "HyperLogLog 去重"],
            ),
            Question::new(
                "公司数据仓库查询越来越慢，你会如何优化？",
                Scenario,
                Hard,
                &["数据仓库", "分区", "索引"],
                &["分区与分桶", "预聚合", "冷热分层"],
            ),
        ];
        for q in big_data {
            bank.insert("大数据", "技术岗", q);
        }

        let iot = [
            Question::new(
                "MQTT 协议的 QoS 等级分别代表什么？",
                Technical,
                Easy,
                &["mqtt", "qos"],
                &["QoS0 至多一次", "QoS1 至少一次", "QoS2 恰好一次"],
            ),
            Question::new(
                "一个电池供电的传感器节点如何降低功耗？",
                Scenario,
                Easy,
                &["低功耗", "休眠", "传感器"],
                &["休眠唤醒策略", "降低采样和上报频率", "选择低功耗通信"],
            ),
            Question::new(
                "边缘计算在物联网系统中解决了什么问题？",
                Technical,
                Medium,
                &["边缘计算", "延迟", "带宽"],
                &["降低延迟", "节省带宽", "本地自治"],
            ),
            Question::new(
                "十万台设备需要远程固件升级，你会如何设计？",
                Scenario,
                Medium,
                &["固件", "ota", "灰度"],
                &["差分升级", "灰度发布", "失败回滚"],
            ),
            Question::new(
                "如何保证物联网设备与云端通信的安全？",
                Technical,
                Hard,
                &["tls", "认证", "加密"],
                &["双向认证", "传输加密", "密钥管理"],
            ),
        ];
        for q in iot {
            bank.insert("物联网", "技术岗", q);
        }

        bank
    }
}
