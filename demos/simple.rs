use tw_truth::analyze_config;

fn main() {
    let config = r#"
        module.exports = {
            theme: {
                extend: {
                    colors: { brand: { DEFAULT: '#f97316', dark: '#c2410c' } },
                    spacing: { 18: '4.5rem' },
                },
            },
        };
    "#;

    let markup = r#"<button className="px-4 py-18 bg-brand hover:bg-brand-darker text-md w-[120px]">Save</button>"#;

    match analyze_config(config, "tailwind.config.js") {
        Ok(analysis) => {
            let result = analysis.validate_source(markup);
            println!("Validation result:\n{}", result.to_json().unwrap());
        }
        Err(e) => {
            eprintln!("Failed to read configuration: {:?}", miette::Report::new(e));
        }
    }
}
