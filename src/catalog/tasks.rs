use serde::Serialize;

/// Task template category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Vision,
    Code,
    Creative,
    Analysis,
    Reasoning,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Text,
        Category::Reasoning,
        Category::Code,
        Category::Vision,
        Category::Creative,
        Category::Analysis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Vision => "vision",
            Category::Code => "code",
            Category::Creative => "creative",
            Category::Analysis => "analysis",
            Category::Reasoning => "reasoning",
        }
    }
}

/// A predefined task configuration used to pre-fill the playground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<&'static str>,
    pub default_prompt: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub static TASKS: [TaskTemplate; 15] = [
    TaskTemplate {
        id: "chat",
        title: "Chat Completion",
        description: "Have a conversation with an AI assistant",
        category: Category::Text,
        model: "openai/gpt-oss-120b",
        system_prompt: Some("You are a helpful, friendly, and knowledgeable assistant."),
        default_prompt: "Hello! How can you help me today?",
        icon: "💬",
        color: "bg-blue-500",
    },
    TaskTemplate {
        id: "summarize",
        title: "Text Summarization",
        description: "Summarize long texts into concise summaries",
        category: Category::Text,
        model: "meta-llama/Llama-3.1-8B-Instruct",
        system_prompt: Some(
            "You are an expert at creating clear, concise summaries. Focus on the key points and main ideas.",
        ),
        default_prompt: "Please summarize this article about artificial intelligence trends in 2024: [paste your text here]",
        icon: "📄",
        color: "bg-green-500",
    },
    TaskTemplate {
        id: "translate",
        title: "Language Translation",
        description: "Translate text between different languages",
        category: Category::Text,
        model: "moonshotai/Kimi-K2-Instruct",
        system_prompt: Some(
            "You are a professional translator. Provide accurate translations while preserving context and meaning.",
        ),
        default_prompt: "Translate this text to Spanish: \"Hello, how are you doing today?\"",
        icon: "🌍",
        color: "bg-purple-500",
    },
    TaskTemplate {
        id: "code-generation",
        title: "Code Generation",
        description: "Generate code snippets and functions",
        category: Category::Code,
        model: "Qwen/Qwen3-Coder-480B-A35B-Instruct",
        system_prompt: Some(
            "You are a senior software engineer. Write clean, efficient, and well-documented code.",
        ),
        default_prompt: "Write a Python function that calculates the fibonacci sequence up to n numbers",
        icon: "💻",
        color: "bg-orange-500",
    },
    TaskTemplate {
        id: "code-review",
        title: "Code Review",
        description: "Review and improve existing code",
        category: Category::Code,
        model: "deepseek-ai/DeepSeek-V3-0324",
        system_prompt: Some(
            "You are a senior developer conducting a code review. Provide constructive feedback and suggestions.",
        ),
        default_prompt: "Review this JavaScript function and suggest improvements:\n\nfunction add(a, b) {\n  return a + b;\n}",
        icon: "🔍",
        color: "bg-red-500",
    },
    TaskTemplate {
        id: "creative-writing",
        title: "Creative Writing",
        description: "Generate creative stories and content",
        category: Category::Creative,
        model: "moonshotai/Kimi-K2-Instruct",
        system_prompt: Some(
            "You are a creative writer with a vivid imagination. Craft engaging and original stories.",
        ),
        default_prompt: "Write a short story about a robot who discovers emotions for the first time",
        icon: "✍️",
        color: "bg-pink-500",
    },
    TaskTemplate {
        id: "email-writing",
        title: "Email Composition",
        description: "Write professional emails and messages",
        category: Category::Text,
        model: "meta-llama/Llama-3.1-8B-Instruct",
        system_prompt: Some(
            "You are a professional communication expert. Write clear, concise, and appropriate emails.",
        ),
        default_prompt: "Write a professional email to schedule a meeting with a client next week",
        icon: "📧",
        color: "bg-indigo-500",
    },
    TaskTemplate {
        id: "data-analysis",
        title: "Data Analysis",
        description: "Analyze and interpret data patterns",
        category: Category::Analysis,
        model: "meta-llama/Llama-3.3-70B-Instruct",
        system_prompt: Some(
            "You are a data analyst. Provide insights and interpretations based on data patterns.",
        ),
        default_prompt: "Analyze this sales data and provide insights: Q1: $100k, Q2: $120k, Q3: $110k, Q4: $140k",
        icon: "📊",
        color: "bg-teal-500",
    },
    TaskTemplate {
        id: "image-analysis",
        title: "Image Analysis",
        description: "Analyze and describe images in detail",
        category: Category::Vision,
        model: "meta-llama/Llama-4-Scout-17B-16E-Instruct",
        system_prompt: Some(
            "You are an expert at analyzing images. Provide detailed, accurate descriptions.",
        ),
        default_prompt: "Describe what you see in this image in detail.",
        icon: "🖼️",
        color: "bg-cyan-500",
    },
    TaskTemplate {
        id: "question-answering",
        title: "Question Answering",
        description: "Answer questions based on context or knowledge",
        category: Category::Text,
        model: "moonshotai/Kimi-K2-Instruct",
        system_prompt: Some(
            "You are a knowledgeable assistant. Provide accurate and helpful answers to questions.",
        ),
        default_prompt: "What are the benefits of renewable energy sources?",
        icon: "❓",
        color: "bg-yellow-500",
    },
    TaskTemplate {
        id: "sentiment-analysis",
        title: "Sentiment Analysis",
        description: "Analyze the sentiment and emotion in text",
        category: Category::Analysis,
        model: "meta-llama/Llama-3.1-8B-Instruct",
        system_prompt: Some(
            "You are an expert at analyzing sentiment and emotions in text. Provide detailed analysis.",
        ),
        default_prompt: "Analyze the sentiment of this customer review: \"The product arrived quickly and works perfectly. Great customer service!\"",
        icon: "😊",
        color: "bg-emerald-500",
    },
    TaskTemplate {
        id: "blog-writing",
        title: "Blog Post Writing",
        description: "Create engaging blog posts and articles",
        category: Category::Creative,
        model: "moonshotai/Kimi-K2-Instruct",
        system_prompt: Some(
            "You are a skilled content writer. Create engaging, informative, and well-structured blog posts.",
        ),
        default_prompt: "Write a blog post about the benefits of remote work for software developers",
        icon: "📝",
        color: "bg-violet-500",
    },
    TaskTemplate {
        id: "complex-reasoning",
        title: "Complex Reasoning",
        description: "Solve complex problems that require step-by-step thinking",
        category: Category::Reasoning,
        model: "deepseek-ai/DeepSeek-R1-0528",
        system_prompt: Some(
            "You are an expert at breaking down complex problems into logical steps. Think through each step carefully.",
        ),
        default_prompt: "A farmer has 17 sheep. All but 9 die. How many sheep are left? Show your reasoning step by step.",
        icon: "🧩",
        color: "bg-indigo-500",
    },
    TaskTemplate {
        id: "mathematical-reasoning",
        title: "Mathematical Reasoning",
        description: "Solve mathematical problems with detailed explanations",
        category: Category::Reasoning,
        model: "Qwen/Qwen3-235B-A22B-Thinking-2507",
        system_prompt: Some(
            "You are a mathematics expert. Solve problems step by step with clear explanations.",
        ),
        default_prompt: "If a triangle has sides of length 3, 4, and 5 units, what type of triangle is it and what is its area?",
        icon: "🔢",
        color: "bg-blue-600",
    },
    TaskTemplate {
        id: "logical-puzzles",
        title: "Logical Puzzles",
        description: "Solve logical puzzles and brain teasers",
        category: Category::Reasoning,
        model: "deepseek-ai/DeepSeek-V3-0324",
        system_prompt: Some(
            "You are an expert at solving logical puzzles. Think through each clue systematically.",
        ),
        default_prompt: "Three switches control three light bulbs in another room. You can flip the switches as much as you want, but can only go to the other room once. How do you determine which switch controls which bulb?",
        icon: "🎯",
        color: "bg-purple-600",
    },
];

/// Look up a template by id.
pub fn task_by_id(id: &str) -> Option<&'static TaskTemplate> {
    TASKS.iter().find(|task| task.id == id)
}

/// All templates in a category, in catalog order.
pub fn tasks_by_category(category: Category) -> impl Iterator<Item = &'static TaskTemplate> {
    TASKS.iter().filter(move |task| task.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = TASKS.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TASKS.len());
    }

    #[test]
    fn test_task_by_id() {
        let task = task_by_id("chat").unwrap();
        assert_eq!(task.model, "openai/gpt-oss-120b");
        assert!(task_by_id("missing").is_none());
    }

    #[test]
    fn test_every_category_is_used() {
        for category in Category::ALL {
            assert!(
                tasks_by_category(category).next().is_some(),
                "no template for {}",
                category.as_str()
            );
        }
        assert_eq!(tasks_by_category(Category::Reasoning).count(), 3);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(task_by_id("image-analysis").unwrap()).unwrap();
        assert_eq!(value["category"], "vision");
        assert_eq!(
            value["defaultPrompt"],
            "Describe what you see in this image in detail."
        );
        assert!(value["systemPrompt"].is_string());
    }
}
