#![no_main]

use host::{Document, outer_html};
use libfuzzer_sys::fuzz_target;
use runtime::Template;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let stream = html::tokenize(markup);
    let _ = html::build_fragment(&stream);

    let mut doc = Document::new();
    for (ce, svg) in [(false, false), (true, false), (false, true)] {
        let template = Template::new(markup, ce, svg);
        if let Ok(root) = template.instantiate(&mut doc) {
            let first = outer_html(&doc, root);
            let again = template
                .instantiate(&mut doc)
                .expect("a template that instantiated once instantiates again");
            assert_eq!(first, outer_html(&doc, again));
        }
    }
});
