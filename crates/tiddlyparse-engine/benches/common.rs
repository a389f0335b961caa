// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_div_wiki(tiddlers: usize) -> String {
    let mut store = String::new();
    for index in 0..tiddlers {
        store.push_str(&format!(
            "<div created=\"20210101000000{index:03}\" modified=\"20210102000000000\" tags=\"Bench [[Generated Tiddler]]\" title=\"Tiddler {index}\">\n<pre>Paragraph {index} with &lt;$link to=&quot;Tiddler {next}&quot;/&gt; &amp; some more text.\n\n* a list item\n* another item\n</pre>\n</div>\n",
            next = index + 1
        ));
    }
    wrap(&format!(
        "<div id=\"storeArea\" style=\"display:none;\">{store}</div>"
    ))
}

#[allow(dead_code)]
pub fn generate_json_wiki(tiddlers: usize) -> String {
    let mut records = Vec::with_capacity(tiddlers);
    for index in 0..tiddlers {
        records.push(format!(
            "{{\"created\":\"20210101000000{index:03}\",\"modified\":\"20210102000000000\",\"tags\":\"Bench [[Generated Tiddler]]\",\"title\":\"Tiddler {index}\",\"text\":\"Paragraph {index} with \\u003C$link to=\\\"Tiddler {next}\\\"/> & some more text.\\n\\n* a list item\\n* another item\\n\"}}",
            next = index + 1
        ));
    }
    wrap(&format!(
        "<script class=\"tiddlywiki-tiddler-store\" type=\"application/json\">[\n{}\n]</script><div id=\"storeArea\" style=\"display:none;\"></div>",
        records.join(",\n")
    ))
}

fn wrap(store: &str) -> String {
    let boot = "<script type=\"text/javascript\">\nvar _boot = (function($tw) { return $tw; });\n</script>\n".repeat(50);
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>Bench</title>\n</head>\n<body class=\"tc-body\">\n<!--~~ Ordinary tiddlers ~~-->\n{store}\n<!--~~ Library modules ~~-->\n<div id=\"libraryModules\" style=\"display:none;\">\n{boot}</div>\n</body>\n</html>\n"
    )
}
