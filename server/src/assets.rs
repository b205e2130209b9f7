/// Shared page header, fetched by both client pages.
pub const COMMON_HTML_PAGE: &str = r#"<header class="app-header">
	<a class="brand" href="index.html">Microservice Coupling</a>
	<nav>
		<a href="index.html">Graph</a>
		<a href="index.html?commitView=true">Commit view</a>
	</nav>
</header>
"#;
