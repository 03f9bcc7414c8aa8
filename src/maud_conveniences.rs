use maud::{Markup, Render, html};

/// A captioned listing. Empty listings keep their column headings and show `empty_message`
/// across the full width instead of a blank body.
pub fn render_table<const N: usize>(
    caption: &'static str,
    headings: [&'static str; N],
    rows: Vec<[Markup; N]>,
    empty_message: &'static str,
) -> Markup {
    html! {
        section class="w-full" {
            div class="flex flex-row items-baseline justify-between mb-4" {
                (heading(caption))
                (count_badge(rows.len()))
            }
            div class="overflow-x-auto rounded border border-gray-700" {
                table class="min-w-full text-sm" {
                    thead class="bg-gray-700 uppercase tracking-wide text-xs text-gray-300" {
                        tr {
                            @for column in headings {
                                th scope="col" class="py-3 px-4 text-left" {(column)}
                            }
                        }
                    }
                    tbody class="divide-y divide-gray-700" {
                        @if rows.is_empty() {
                            tr {
                                td colspan=(N) class="py-6 px-4 text-center italic text-gray-400" {(empty_message)}
                            }
                        } @else {
                            @for row in rows {
                                tr class="odd:bg-gray-800 even:bg-gray-900 hover:bg-gray-700" {
                                    @for cell in row {
                                        td class="py-2 px-4 text-gray-200" {(cell)}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn heading(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold" {(s)}
    }
}

pub fn count_badge(count: usize) -> Markup {
    html! {
        span class="rounded-full bg-blue-700 px-3 py-1 text-sm font-semibold" {
            "Registered students: " (count)
        }
    }
}
