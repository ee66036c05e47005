//! Page-context scripts used by evaluation fallbacks. Each is a single expression.

/// Serialized markup of the whole document.
pub const PAGE_MARKUP: &str = "document.documentElement ? document.documentElement.outerHTML : ''";

/// Title, meta description and heading text.
pub const PAGE_SUMMARY: &str = "(() => { const meta = document.querySelector('meta[name=\"description\"]'); const headings = Array.from(document.querySelectorAll('h1, h2, h3')).map((h) => (h.textContent || '').replace(/\\s+/g, ' ').trim()).filter(Boolean).slice(0, 25); return { title: document.title || '', description: meta ? (meta.getAttribute('content') || '') : '', headings }; })()";

/// Anchors and buttons with their visible text.
pub const PAGE_CONTROLS: &str = "(() => { const text = (el) => (el.textContent || '').replace(/\\s+/g, ' ').trim(); const links = Array.from(document.querySelectorAll('a[href]')).slice(0, 200).map((a) => ({ text: text(a), href: a.getAttribute('href') || '' })); const buttons = Array.from(document.querySelectorAll('button, [role=\"button\"]')).slice(0, 100).map((b) => ({ text: text(b) })); return { links, buttons }; })()";
