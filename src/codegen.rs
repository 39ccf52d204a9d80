//! Renders a [`RequestDescription`] as standalone code in other languages.
//!
//! Output never contains the raw API key: the bearer token and client key are
//! always passed through [`mask_api_key`].

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::protocol::{ChatCompletionBody, ExportResponse};
use crate::request::{RequestDescription, CHAT_COMPLETIONS_PATH, MODELS_PATH};

/// Provider base URL shown in exported code.
pub const DEFAULT_BASE_URL: &str = "https://api.inference.wandb.ai/v1";

/// Export target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    Shell,
    Python,
    #[value(name = "typescript")]
    TypeScript,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Shell, Target::Python, Target::TypeScript];

    pub fn label(self) -> &'static str {
        match self {
            Target::Shell => "cURL",
            Target::Python => "Python",
            Target::TypeScript => "TypeScript",
        }
    }
}

/// Show the first and last four characters of a key. Short keys are fully starred.
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Render against the default provider base URL.
pub fn render(request: &RequestDescription, target: Target) -> String {
    render_with_base_url(DEFAULT_BASE_URL, request, target)
}

pub fn render_with_base_url(base_url: &str, request: &RequestDescription, target: Target) -> String {
    let base_url = base_url.trim_end_matches('/');
    match target {
        Target::Shell => render_shell(base_url, request),
        Target::Python => render_python(base_url, request),
        Target::TypeScript => render_typescript(base_url, request),
    }
}

/// Render every target.
pub fn render_all(base_url: &str, request: &RequestDescription) -> ExportResponse {
    ExportResponse {
        shell: render_with_base_url(base_url, request, Target::Shell),
        python: render_with_base_url(base_url, request, Target::Python),
        typescript: render_with_base_url(base_url, request, Target::TypeScript),
    }
}

/// Headers with the authorization value masked.
fn masked_headers(request: &RequestDescription) -> Vec<(String, String)> {
    let masked_key = mask_api_key(&request.credentials.api_key);
    request
        .headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("authorization") {
                (name.clone(), format!("Bearer {masked_key}"))
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

fn render_shell(base_url: &str, request: &RequestDescription) -> String {
    let mut lines = vec![format!(
        "curl -X {} {}{}",
        request.method, base_url, request.endpoint
    )];

    for (name, value) in masked_headers(request) {
        lines.push(format!("  -H \"{}: {}\"", shell_double_quote(&name), shell_double_quote(&value)));
    }

    if let Some(body) = &request.body {
        let json = pretty_json(body, b"  ");
        lines.push(format!("  -d '{}'", json.replace('\'', r"'\''")));
    }

    lines.join(" \\\n")
}

fn shell_double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn render_python(base_url: &str, request: &RequestDescription) -> String {
    let masked_key = mask_api_key(&request.credentials.api_key);
    let mut code = String::new();

    code.push_str("import openai\n\n");
    code.push_str("# Initialize the W&B Inference client\n");
    code.push_str("client = openai.OpenAI(\n");
    code.push_str(&format!("    base_url={},\n", quote_single(base_url)));
    code.push_str(&format!("    api_key={},\n", quote_single(&masked_key)));
    code.push_str("    default_headers={\n");
    for (name, value) in masked_headers(request) {
        code.push_str(&format!("        {}: {},\n", quote_single(&name), quote_single(&value)));
    }
    code.push_str("    },\n");
    code.push_str(")\n\n");

    match (request.endpoint, &request.body) {
        (CHAT_COMPLETIONS_PATH, Some(body)) => {
            code.push_str("# Create a chat completion\n");
            code.push_str("response = client.chat.completions.create(\n");
            code.push_str(&format!("    model={},\n", quote_single(&body.model)));
            code.push_str(&format!(
                "    messages={},\n",
                indent_continuation(&pretty_json(&body.messages, b"    "), "    ")
            ));
            push_sampling(&mut code, body, "    ", "=");
            code.push_str(")\n\n");
            code.push_str("print(response.choices[0].message.content)");
        }
        (MODELS_PATH, _) => {
            code.push_str("# List available models\n");
            code.push_str("models = client.models.list()\n\n");
            code.push_str("for model in models.data:\n");
            code.push_str("    print(f\"Model: {model.id}\")");
        }
        _ => {}
    }

    code
}

fn render_typescript(base_url: &str, request: &RequestDescription) -> String {
    let masked_key = mask_api_key(&request.credentials.api_key);
    let mut code = String::new();

    code.push_str("import OpenAI from 'openai';\n\n");
    code.push_str("// Initialize the W&B Inference client\n");
    code.push_str("const client = new OpenAI({\n");
    code.push_str(&format!("  baseURL: {},\n", quote_single(base_url)));
    code.push_str(&format!("  apiKey: {},\n", quote_single(&masked_key)));
    code.push_str("  defaultHeaders: {\n");
    for (name, value) in masked_headers(request) {
        code.push_str(&format!("    {}: {},\n", quote_single(&name), quote_single(&value)));
    }
    code.push_str("  },\n");
    code.push_str("});\n\n");

    match (request.endpoint, &request.body) {
        (CHAT_COMPLETIONS_PATH, Some(body)) => {
            code.push_str("// Create a chat completion\n");
            code.push_str("async function createChatCompletion() {\n");
            code.push_str("  try {\n");
            code.push_str("    const response = await client.chat.completions.create({\n");
            code.push_str(&format!("      model: {},\n", quote_single(&body.model)));
            code.push_str(&format!(
                "      messages: {},\n",
                indent_continuation(&pretty_json(&body.messages, b"  "), "      ")
            ));
            push_sampling(&mut code, body, "      ", ": ");
            code.push_str("    });\n\n");
            code.push_str("    console.log(response.choices[0]?.message?.content);\n");
            code.push_str("    return response;\n");
            push_ts_catch(&mut code);
            code.push_str("// Call the function\n");
            code.push_str("createChatCompletion();");
        }
        (MODELS_PATH, _) => {
            code.push_str("// List available models\n");
            code.push_str("async function listModels() {\n");
            code.push_str("  try {\n");
            code.push_str("    const models = await client.models.list();\n\n");
            code.push_str("    models.data.forEach((model) => {\n");
            code.push_str("      console.log(`Model: ${model.id}`);\n");
            code.push_str("    });\n\n");
            code.push_str("    return models;\n");
            push_ts_catch(&mut code);
            code.push_str("// Call the function\n");
            code.push_str("listModels();");
        }
        _ => {}
    }

    code
}

fn push_ts_catch(code: &mut String) {
    code.push_str("  } catch (error) {\n");
    code.push_str("    console.error('Error:', error);\n");
    code.push_str("    throw error;\n");
    code.push_str("  }\n");
    code.push_str("}\n\n");
}

fn push_sampling(code: &mut String, body: &ChatCompletionBody, indent: &str, sep: &str) {
    if let Some(temperature) = body.temperature {
        code.push_str(&format!("{indent}temperature{sep}{temperature},\n"));
    }
    if let Some(max_tokens) = body.max_tokens {
        code.push_str(&format!("{indent}max_tokens{sep}{max_tokens},\n"));
    }
}

/// Single-quoted string literal valid in both Python and TypeScript.
fn quote_single(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Python and JavaScript both read `\uXXXX` inside single quotes.
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn pretty_json<T: Serialize + ?Sized>(value: &T, indent: &[u8]) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => "null".to_string(),
    }
}

/// Indent every line after the first.
fn indent_continuation(text: &str, prefix: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::task_by_id;
    use crate::credentials::Credentials;
    use crate::request::{build, Mode};

    const KEY: &str = "abcd1234efgh5678";

    fn chat_request(project: Option<&str>) -> RequestDescription {
        let creds = Credentials::new(KEY, project).unwrap();
        let task = task_by_id("chat").unwrap();
        build(Mode::Templates, Some(task), "Hi", task.model, None, &creds)
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("abcd1234efgh"), "abcd...efgh");
        assert_eq!(mask_api_key("123456789"), "1234...6789");
        assert_eq!(mask_api_key("12345678"), "********");
        assert_eq!(mask_api_key(""), "");
    }

    #[test]
    fn test_no_target_leaks_the_key() {
        let requests = [
            chat_request(None),
            chat_request(Some("acme/demo")),
            RequestDescription::list_models(&Credentials::new(KEY, None).unwrap()),
        ];
        for request in &requests {
            for target in Target::ALL {
                let code = render(request, target);
                assert!(!code.contains(KEY), "{} leaked the key", target.label());
                assert!(code.contains("abcd...5678"), "{} missing masked key", target.label());
            }
        }
    }

    #[test]
    fn test_shell_command_shape() {
        let code = render(&chat_request(Some("acme/demo")), Target::Shell);
        let lines: Vec<&str> = code.lines().collect();

        assert_eq!(
            lines[0],
            "curl -X POST https://api.inference.wandb.ai/v1/chat/completions \\"
        );
        assert_eq!(lines[1], "  -H \"Content-Type: application/json\" \\");
        assert_eq!(lines[2], "  -H \"Authorization: Bearer abcd...5678\" \\");
        assert_eq!(lines[3], "  -H \"OpenAI-Project: acme/demo\" \\");
        assert!(lines[4].starts_with("  -d '{"));
        assert!(code.ends_with("}'"));
        assert!(code.contains("\"max_tokens\": 500"));
    }

    #[test]
    fn test_shell_escapes_single_quotes_in_body() {
        let creds = Credentials::new(KEY, None).unwrap();
        let request = build(Mode::Blank, None, "it's", "m", None, &creds);
        let code = render(&request, Target::Shell);
        assert!(code.contains(r"it'\''s"));
    }

    #[test]
    fn test_shell_without_project_omits_header() {
        let code = render(&chat_request(None), Target::Shell);
        assert!(!code.contains("OpenAI-Project"));
    }

    #[test]
    fn test_shell_models_has_no_body() {
        let request = RequestDescription::list_models(&Credentials::new(KEY, None).unwrap());
        let code = render(&request, Target::Shell);
        assert!(code.starts_with("curl -X GET https://api.inference.wandb.ai/v1/models \\"));
        assert!(!code.contains("-d '"));
        assert!(!code.ends_with('\\'));
    }

    #[test]
    fn test_python_chat_completion() {
        let code = render(&chat_request(Some("acme/demo")), Target::Python);
        assert!(code.starts_with("import openai\n"));
        assert!(code.contains("    base_url='https://api.inference.wandb.ai/v1',\n"));
        assert!(code.contains("        'OpenAI-Project': 'acme/demo',\n"));
        assert!(code.contains("response = client.chat.completions.create(\n"));
        assert!(code.contains("    model='openai/gpt-oss-120b',\n"));
        assert!(code.contains("    messages=[\n"));
        assert!(code.contains("    temperature=0.7,\n"));
        assert!(code.contains("    max_tokens=500,\n"));
        assert!(code.ends_with("print(response.choices[0].message.content)"));
    }

    #[test]
    fn test_python_models_listing() {
        let request = RequestDescription::list_models(&Credentials::new(KEY, None).unwrap());
        let code = render(&request, Target::Python);
        assert!(code.contains("models = client.models.list()"));
        assert!(!code.contains("chat.completions"));
    }

    #[test]
    fn test_typescript_chat_completion() {
        let code = render(&chat_request(None), Target::TypeScript);
        assert!(code.starts_with("import OpenAI from 'openai';\n"));
        assert!(code.contains("  apiKey: 'abcd...5678',\n"));
        assert!(code.contains("      model: 'openai/gpt-oss-120b',\n"));
        assert!(code.contains("      temperature: 0.7,\n"));
        assert!(code.contains("      max_tokens: 500,\n"));
        assert!(code.ends_with("createChatCompletion();"));
    }

    #[test]
    fn test_typescript_models_listing() {
        let request = RequestDescription::list_models(&Credentials::new(KEY, None).unwrap());
        let code = render(&request, Target::TypeScript);
        assert!(code.contains("const models = await client.models.list();"));
        assert!(code.ends_with("listModels();"));
    }

    #[test]
    fn test_custom_base_url_is_trimmed() {
        let code = render_with_base_url("http://localhost:8080/v1/", &chat_request(None), Target::Shell);
        assert!(code.starts_with("curl -X POST http://localhost:8080/v1/chat/completions"));
    }

    #[test]
    fn test_quote_single_escapes() {
        assert_eq!(quote_single("it's"), r"'it\'s'");
        assert_eq!(quote_single("a\\b"), r"'a\\b'");
    }

    #[test]
    fn test_quote_single_escapes_control_characters() {
        assert_eq!(quote_single("a\u{0}b"), r"'a\u0000b'");
        assert_eq!(quote_single("bell\u{7}"), r"'bell\u0007'");
        assert_eq!(quote_single("del\u{7f}"), r"'del\u007f'");
        assert_eq!(quote_single("x\u{2028}y\u{2029}"), r"'x\u2028y\u2029'");
        assert_eq!(quote_single("héllo"), "'héllo'");
    }

    #[test]
    fn test_render_all_covers_every_target() {
        let out = render_all(DEFAULT_BASE_URL, &chat_request(None));
        assert!(out.shell.starts_with("curl"));
        assert!(out.python.starts_with("import openai"));
        assert!(out.typescript.starts_with("import OpenAI"));
    }
}
