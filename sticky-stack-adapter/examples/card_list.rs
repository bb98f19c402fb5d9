// Example: a page of 30 cards whose headers stack as the page scrolls.
use sticky_stack::StackOptions;
use sticky_stack_adapter::{MemoryHost, Provider};

fn main() {
    let mut host = MemoryHost::new(600).with_lead(80);
    let mut provider = Provider::new(StackOptions::new());

    // Each card: a header of varying height followed by its content.
    let headers: Vec<_> = (0..30u32)
        .map(|i| {
            let nodes = host.push_card(32 + (i % 3) * 8, 180);
            (nodes, provider.attach(nodes.header, nodes.padding))
        })
        .collect();
    provider.mount(&mut host).expect("fresh provider");

    for target in [0u64, 120, 400, 900, 2_000, 600] {
        let scroll = host.scroll_to(target);

        // One pass per frame, then render every header.
        let report = provider.on_animation_frame(&host);
        provider.for_each_placement(|entry, placement| {
            host.apply_placement(entry.handle, placement);
        });

        let stuck: Vec<_> = headers
            .iter()
            .enumerate()
            .filter(|(_, (_, h))| h.use_stacking().is_fixed)
            .map(|(i, (_, h))| (i, h.style().to_string()))
            .collect();
        println!(
            "scroll={scroll} passes={} changed={} stuck={} stack_height={} doc_height={}",
            provider.stack().passes(),
            report.map_or(0, |r| r.changed),
            stuck.len(),
            provider.stack().stack_height(),
            host.document_height(),
        );
        if let Some((i, style)) = stuck.last() {
            println!("  last stuck: card {i} `{style}`");
        }
    }

    drop(headers);
    provider.unmount(&mut host);
    println!("listeners after unmount={}", host.listener_count());
}
