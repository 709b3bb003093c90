//! Name filter sets and path heuristics shared across the pipeline.
//!
//! Built-in and common-method names are filtered during extraction and
//! resolution so that language-native calls never become false cross-file
//! edges.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Python built-in names that should never resolve as cross-file targets.
pub static PY_BUILTINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // Keywords / constants
        "self", "cls", "None", "True", "False",
        // Built-in functions
        "print", "len", "range", "str", "int", "float", "bool", "list", "dict",
        "set", "tuple", "type", "isinstance", "issubclass", "super", "property",
        "staticmethod", "classmethod", "enumerate", "zip", "map", "filter",
        "sorted", "reversed", "any", "all", "min", "max", "sum", "abs",
        "open", "input", "repr", "hash", "id", "dir", "vars", "getattr",
        "setattr", "hasattr", "delattr", "callable", "iter", "next", "hex",
        "oct", "bin", "ord", "chr", "format", "round", "pow", "divmod",
        "object", "Exception", "ValueError", "TypeError", "KeyError",
        "IndexError", "AttributeError", "RuntimeError", "StopIteration",
        "NotImplementedError", "OSError", "IOError", "FileNotFoundError",
        "ImportError", "NameError", "ZeroDivisionError", "AssertionError",
        "breakpoint", "compile", "eval", "exec", "globals", "locals",
        "__import__", "__name__", "__file__", "__init__",
    ])
});

/// Method names on built-in types that create false cross-file edges when
/// taken at face value (`data.get(...)`, `log.info(...)`, ...).
pub static COMMON_ATTR_METHODS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // dict/set/list methods
        "get", "set", "add", "pop", "push", "put",
        "append", "extend", "insert", "remove", "clear", "copy", "update",
        "keys", "values", "items", "setdefault",
        // string methods
        "format", "strip", "rstrip", "lstrip", "split", "join",
        "replace", "find", "index", "count", "startswith", "endswith",
        "encode", "decode", "lower", "upper", "title", "capitalize",
        // file/io methods
        "read", "write", "close", "flush", "seek",
        // sequence methods
        "sort", "reverse",
        // async/generator methods
        "send", "throw",
        // logging methods
        "debug", "info", "warning", "error", "critical", "exception",
        // HTTP/request methods
        "raise_for_status", "post", "patch", "delete", "head", "options",
        // DB/ORM methods
        "execute", "fetchone", "fetchall", "fetchmany", "commit", "rollback",
        "select", "where", "filter", "order_by", "group_by", "limit", "offset",
        "eq", "ne", "gt", "lt", "gte", "lte", "like", "ilike",
        "table", "upsert",
        // serialization methods
        "dumps", "loads", "model_dump", "model_validate", "dict", "json",
        // datetime methods
        "isoformat", "strftime", "strptime", "timestamp", "date", "time",
        "now", "utcnow", "today", "fromtimestamp", "fromisoformat",
        // testing methods
        "get_json", "assert_called", "assert_called_once", "assert_called_with",
        "assert_not_called", "assert_called_once_with",
        // path methods
        "exists", "mkdir", "rmdir", "unlink", "rename", "resolve",
        "is_file", "is_dir", "iterdir", "glob", "stat",
        // misc common methods
        "run", "start", "stop", "wait", "sleep", "acquire", "release",
        "match", "search", "sub", "findall",
        "invoke", "dispatch", "emit", "listen",
    ])
});

/// Python standard-library top-level module names. Calls through these
/// (`json.dumps`, `os.getenv`) are dropped during extraction.
pub static STDLIB_MODULES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "abc", "argparse", "array", "ast", "asyncio", "atexit",
        "base64", "binascii", "bisect", "builtins",
        "calendar", "cgi", "cgitb", "codecs", "collections", "colorsys",
        "compileall", "concurrent", "configparser", "contextlib", "contextvars",
        "copy", "copyreg", "csv", "ctypes", "curses",
        "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis",
        "distutils", "doctest",
        "email", "encodings", "enum", "errno",
        "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch",
        "fractions", "ftplib", "functools",
        "gc", "getpass", "gettext", "glob", "grp", "gzip",
        "hashlib", "heapq", "hmac", "html", "http",
        "imaplib", "importlib", "inspect", "io", "ipaddress", "itertools",
        "json",
        "keyword",
        "linecache", "locale", "logging", "lzma",
        "mailbox", "math", "mimetypes", "mmap", "multiprocessing",
        "netrc", "numbers",
        "operator", "os", "ossaudiodev",
        "pathlib", "pdb", "pickle", "pickletools", "pipes", "pkgutil",
        "platform", "plistlib", "poplib", "posixpath", "pprint",
        "profile", "pstats", "pty", "pwd", "py_compile", "pydoc",
        "queue",
        "random", "re", "readline", "reprlib", "resource", "rlcompleter",
        "runpy",
        "sched", "secrets", "select", "selectors", "shelve", "shlex",
        "shutil", "signal", "site", "smtplib", "socket", "socketserver",
        "sqlite3", "ssl", "stat", "statistics", "string", "stringprep",
        "struct", "subprocess", "sunau", "symtable", "sys", "sysconfig",
        "syslog",
        "tabnanny", "tarfile", "tempfile", "termios", "test", "textwrap",
        "threading", "time", "timeit", "tkinter", "token", "tokenize",
        "tomllib", "trace", "traceback", "tracemalloc", "tty", "turtle",
        "types", "typing",
        "unicodedata", "unittest", "urllib", "uuid",
        "venv",
        "warnings", "wave", "weakref", "webbrowser",
        "xml", "xmlrpc",
        "zipfile", "zipimport", "zlib",
        "_thread", "_io", "_collections_abc",
    ])
});

/// Well-known third-party package roots whose members are never resolved as
/// graph targets; they are not part of the project.
pub static KNOWN_EXTERNAL_PACKAGES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "aiohttp", "aiofiles", "aiomysql", "aiopg", "aiosqlite",
        "anthropic", "anyio",
        "bcrypt", "beautifulsoup4", "boto3", "botocore",
        "celery", "certifi", "cffi", "charset_normalizer", "click",
        "cryptography",
        "databases", "django", "docker", "dotenv",
        "elasticsearch",
        "faker", "fastapi", "flask", "freezegun",
        "gevent", "google", "grpc", "gunicorn",
        "httpcore", "httpx",
        "jinja2",
        "kombu",
        "loguru",
        "marshmallow", "motor", "msgpack", "mypy",
        "numpy",
        "openai",
        "pandas", "paramiko", "pillow", "psycopg2", "pydantic",
        "pymongo", "pytest", "pytz",
        "redis", "requests", "respx", "rich", "ruff",
        "scipy", "sentry_sdk", "setuptools", "sklearn", "sniffio",
        "sqlalchemy", "starlette", "stripe", "supabase",
        "tenacity", "toml", "torch", "tortoise", "trio", "twilio",
        "ujson", "uvicorn", "uvloop",
        "websockets",
        "yaml",
    ])
});

/// Prefixes of framework/test entry points excluded from dead-code reports.
pub const FRAMEWORK_DEAD_CODE_PREFIXES: [&str; 4] = ["test_", "visit_", "setUp", "tearDown"];

/// Every file extension the extractor registry can dispatch on.
pub const SUPPORTED_EXTENSIONS: [&str; 18] = [
    ".py", ".pyi", ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs",
    ".rs", ".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx", ".h",
    ".c", ".java",
];

const TEST_DIRS: [&str; 5] = ["tests", "test", "testing", "__tests__", "spec"];

/// Multi-language test-file heuristic.
///
/// Basename patterns per language plus ancestor-directory detection; used by
/// the resolver, dead-code search, and cycle detection.
pub fn is_test_file(path: &str) -> bool {
    let normalized = path.replace('\\', "/");
    let basename = normalized.rsplit('/').next().unwrap_or(&normalized);

    // Python: test_*.py, *_test.py
    if basename.starts_with("test_") || basename.ends_with("_test.py") {
        return true;
    }
    // JS/TS: *.test.ts, *.spec.ts, and friends
    for suffix in [
        ".test.ts", ".spec.ts", ".test.tsx", ".spec.tsx",
        ".test.js", ".spec.js", ".test.jsx", ".spec.jsx",
        ".test.mjs", ".spec.mjs",
    ] {
        if basename.ends_with(suffix) {
            return true;
        }
    }
    // Rust
    if basename.ends_with("_test.rs") {
        return true;
    }
    // Java
    if basename.ends_with("Test.java") || basename.ends_with("Tests.java") {
        return true;
    }
    // C/C++
    for suffix in ["_test.cpp", "_test.cc", "_test.cxx", "_test.c", "_test.hpp", "_test.h"] {
        if basename.ends_with(suffix) {
            return true;
        }
    }

    normalized.split('/').any(|part| TEST_DIRS.contains(&part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_detection_by_basename() {
        assert!(is_test_file("test_auth.py"));
        assert!(is_test_file("src/auth_test.py"));
        assert!(is_test_file("src/button.test.tsx"));
        assert!(is_test_file("src/api.spec.js"));
        assert!(is_test_file("src/graph_test.rs"));
        assert!(is_test_file("src/AuthServiceTest.java"));
        assert!(is_test_file("src/parser_test.cpp"));
        assert!(!is_test_file("src/auth.py"));
        assert!(!is_test_file("src/latest.py"));
    }

    #[test]
    fn test_file_detection_by_directory() {
        assert!(is_test_file("tests/helpers.py"));
        assert!(is_test_file("pkg/__tests__/util.js"));
        assert!(is_test_file("a/spec/thing.rb"));
        assert!(!is_test_file("contests/entry.py"));
    }

    #[test]
    fn filter_sets_contain_expected_members() {
        assert!(PY_BUILTINS.contains("print"));
        assert!(COMMON_ATTR_METHODS.contains("append"));
        assert!(STDLIB_MODULES.contains("json"));
        assert!(KNOWN_EXTERNAL_PACKAGES.contains("requests"));
        assert!(!PY_BUILTINS.contains("process_payment"));
    }
}
