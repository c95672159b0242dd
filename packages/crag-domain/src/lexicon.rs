//! Static word lists shared by keyword derivation, filtering and reranking.
//!
//! Lookups are linear over short slices and callers pass lowercased input.

pub const STOP_WORDS: &[&str] = &[
	"a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "how",
	"what", "why", "when", "where", "which", "who", "whom", "whose", "can", "do", "does", "did",
	"will", "would", "could", "should", "may", "might", "is", "are", "was", "were", "be", "been",
	"being", "have", "has", "had", "this", "that", "these", "those", "it", "its", "they", "them",
	"their", "we", "you", "he", "she", "his", "her", "our", "your", "my", "me", "i",
];

/// Broader English list applied before lexical similarity.
pub const SIMILARITY_STOP_WORDS: &[&str] = &[
	"a", "about", "above", "after", "again", "against", "all", "also", "am", "among", "an", "and",
	"any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
	"both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each",
	"either", "else", "etc", "even", "ever", "every", "few", "for", "from", "further", "had",
	"has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "however", "i",
	"if", "in", "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most",
	"much", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "once",
	"only", "or", "other", "our", "ours", "out", "over", "own", "per", "rather", "same", "she",
	"should", "since", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
	"then", "there", "these", "they", "this", "those", "through", "thus", "to", "too", "under",
	"until", "up", "upon", "us", "very", "via", "was", "we", "were", "what", "when", "where",
	"whether", "which", "while", "who", "whom", "whose", "why", "will", "with", "within",
	"without", "would", "yet", "you", "your", "yours",
];

pub const TECHNICAL_TERMS: &[&str] = &[
	"neural",
	"artificial",
	"machine",
	"learning",
	"deep",
	"network",
	"algorithm",
	"model",
	"system",
	"method",
	"approach",
	"technique",
	"sustainability",
	"corporate",
	"culture",
	"development",
	"management",
	"analysis",
	"research",
	"study",
	"framework",
	"architecture",
	"인공지능",
	"머신러닝",
	"딥러닝",
	"알고리즘",
	"시스템",
	"분석",
	"연구",
];

pub const INTERROGATIVES: &[&str] = &["how", "what", "why", "when", "where", "which", "who"];

/// Primary-language words for which a query implies neighbouring search terms.
pub const RELATED_TERMS: &[(&str, &[&str])] = &[
	("인공지능", &["AI", "머신러닝", "딥러닝", "알고리즘"]),
	("머신러닝", &["ML", "인공지능", "데이터", "모델"]),
	("데이터", &["분석", "처리", "마이닝", "베이스"]),
	("시스템", &["구현", "설계", "아키텍처", "플랫폼"]),
	("보안", &["암호화", "인증", "권한", "프로토콜"]),
	("네트워크", &["통신", "프로토콜", "라우팅", "보안"]),
	("웹", &["인터넷", "브라우저", "서버", "클라이언트"]),
	("모바일", &["스마트폰", "앱", "안드로이드", "iOS"]),
	("클라우드", &["서버", "가상화", "스케일링", "배포"]),
];

/// Alternate terminology used when the judge cannot supply a fresh keyword set. Entries cross
/// scripts so a failed primary-language search can retry in the secondary language and back.
pub const SYNONYMS: &[(&str, &[&str])] = &[
	("인공지능", &["artificial intelligence", "AI", "지능형 시스템"]),
	("머신러닝", &["machine learning", "기계학습", "statistical learning"]),
	("딥러닝", &["deep learning", "심층학습", "neural network"]),
	("데이터", &["data", "dataset", "빅데이터"]),
	("보안", &["security", "cybersecurity", "정보보호"]),
	("네트워크", &["network", "networking", "통신망"]),
	("클라우드", &["cloud computing", "distributed computing", "클라우드 컴퓨팅"]),
	("artificial", &["인공지능", "machine intelligence", "intelligent systems"]),
	("learning", &["training", "학습", "representation learning"]),
	("machine", &["computational", "automated", "기계"]),
	("neural", &["connectionist", "신경망", "perceptron"]),
	("deep", &["multilayer", "심층", "hierarchical"]),
	("network", &["graph", "네트워크", "topology"]),
	("algorithm", &["procedure", "알고리즘", "heuristic"]),
	("model", &["framework", "모델", "architecture"]),
	("data", &["dataset", "데이터", "corpus"]),
	("security", &["cybersecurity", "보안", "privacy"]),
	("sustainability", &["ESG", "지속가능성", "environmental performance"]),
	("management", &["administration", "경영", "governance"]),
	("education", &["instruction", "교육", "pedagogy"]),
];

/// Domain taxonomy used for query/document consistency.
pub const DOMAINS: &[(&str, &[&str])] = &[
	(
		"computer_science",
		&["algorithm", "neural", "network", "machine", "learning", "artificial", "intelligence"],
	),
	("mathematics", &["mathematics", "mathematical", "equation", "theorem", "proof", "calculation"]),
	("medicine", &["medical", "clinical", "patient", "treatment", "diagnosis", "disease"]),
	("engineering", &["engineering", "system", "design", "technology", "implementation"]),
	("business", &["business", "management", "corporate", "strategy", "organization"]),
	("sustainability", &["sustainability", "environmental", "green", "eco", "climate"]),
];

/// Trailing particles and copulas stripped from primary-language words, longest first.
pub const HANGUL_PARTICLES: &[&str] = &[
	"에서는", "으로는", "에게서", "이라는", "입니까", "인가요", "입니다", "에서", "으로", "에게",
	"한테", "께서", "까지", "부터", "보다", "처럼", "이나", "이다", "하는", "하고", "하여", "해서",
	"되는", "적인", "들의", "들이", "들은", "들을", "은", "는", "이", "가", "을", "를", "의", "에",
	"로", "와", "과", "도", "만", "나", "들",
];

/// Question words and function nouns that never make useful search terms.
pub const HANGUL_STOP_NOUNS: &[&str] = &[
	"무엇", "어떻게", "어떤", "왜", "언제", "어디", "누구", "대한", "관한", "통한", "위한", "있는",
	"하는", "되는", "대해", "것",
];

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(&token)
}

pub fn is_similarity_stop_word(token: &str) -> bool {
	SIMILARITY_STOP_WORDS.contains(&token)
}

pub fn is_technical_term(token: &str) -> bool {
	TECHNICAL_TERMS.contains(&token)
}

pub fn is_interrogative(token: &str) -> bool {
	INTERROGATIVES.contains(&token)
}

pub fn is_hangul_stop_noun(token: &str) -> bool {
	HANGUL_STOP_NOUNS.contains(&token)
}
