//! 虚拟路径工具
//!
//! 路径总是以 `/` 开头，段之间用 `/` 连接；根为 `/`。

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

/// 拼接父路径与名称（父为根时不产生双斜杠）
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT || parent.is_empty() {
        format!("{}{}", ROOT, name)
    } else {
        format!("{}{}{}", parent.trim_end_matches(SEPARATOR), SEPARATOR, name)
    }
}

pub fn parent_of(path: &str) -> Option<&str> {
    if path == ROOT || path.is_empty() {
        return None;
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&trimmed[..idx]),
        None => Some(ROOT),
    }
}

pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// `path` 严格位于 `ancestor` 之下（按段对齐，`/doc` 不是 `/docs/a` 的祖先）
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT && path.starts_with(ROOT);
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == SEPARATOR as u8
}

pub fn is_same_or_ancestor(ancestor: &str, path: &str) -> bool {
    ancestor == path || is_ancestor(ancestor, path)
}

/// 把 `path` 上的 `from` 前缀替换为 `to`；前缀不匹配时返回 `None`
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        return Some(to.to_string());
    }
    if !is_ancestor(from, path) {
        return None;
    }
    let rest = if from == ROOT {
        &path[1..]
    } else {
        &path[from.len() + 1..]
    };
    Some(join(to, rest))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    Reserved,
    ContainsSeparator,
}

pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    if name == "." || name == ".." {
        return Err(NameError::Reserved);
    }
    if name.contains(SEPARATOR) {
        return Err(NameError::ContainsSeparator);
    }
    Ok(())
}

/// 把不合法的名称改成可用的名称：`/` 换成 `-`，空名或 `.`/`..` 变成 `untitled`
pub fn sanitize_name(name: &str) -> String {
    let cleaned = name.replace(SEPARATOR, "-");
    match validate_name(&cleaned) {
        Ok(()) => cleaned,
        Err(_) => UNTITLED.to_string(),
    }
}

const UNTITLED: &str = "untitled";

/// `a.md` -> `a (1).md`, `a (2).md` ...，返回第一个未被占用的名称
pub fn disambiguate(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };
    (1u64..)
        .map(|n| format!("{} ({}){}", stem, n, ext))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/models/vpath.rs"]
mod tests;
