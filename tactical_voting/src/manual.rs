/*!

This is the long-form manual for `tactical_voting` and `tva`.

## What is computed

The analysis takes the point of view of one voter in a Borda election with
`m` candidates. A ballot gives `m-1` points to its first candidate, `m-2` to
the second, and so on down to 0. Given the scores of all the *other* voters
and the sincere ranking of the voter, the library answers two questions:

* can the voter make a given candidate win by casting a different ballot?
  ([crate::Strategy::check_winner_possible])
* how high can the voter push their favourite candidate, even if it does not
  win? ([crate::Strategy::highest_position])

[crate::Strategy::check_if_best] combines both: it walks the sincere ranking
from the top and stops at the first candidate that can be made to win, or at
the sincere winner, in which case the voter has nothing to gain.

Ties between candidates are always won by the candidate with the lowest
label: `A` beats `B` on equal scores.

### Leeway

To make the target `T` win, the voter puts it first: `T` ends with
`score(T) + m - 1` points. Every other candidate `x` may then receive at most
`leeway(x)` more points:

* `score(T) + m - 1 - score(x)` if `T < x` (T wins the tie),
* `score(T) + m - 2 - score(x)` otherwise.

The remaining points `m-2, ..., 0` fit under the leeways if and only if the
leeways, sorted in decreasing order, are at least `m-2, ..., 0` position by
position. The ballots themselves are found by a depth-first search capped by
the option limit: with many equal leeways, the number of valid ballots grows
factorially.

### Highest position

When `T` cannot win, the voter can still give the lowest points to the
candidates with enough leeway and keep `T` ahead of them. Those candidates
end up at the bottom of the returned ballots; the candidates `T` cannot beat
fill the positions between `T` and them.

## Input format

`tva` reads an election in JSON:

```text
{
  "outputSettings": { "contestName": "Four candidates" },
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C" }, { "name": "D" } ],
  "rules": { "votingScheme": "borda", "optLimit": 3 },
  "tally": { "A": 7, "B": 6, "C": 3, "D": 0 },
  "voters": [ { "name": "Agent1", "ranking": ["C", "B", "A", "D"] } ]
}
```

* `tally` is the final score of each candidate, *including* the ballots of
  the listed voters.
* `votingScheme` is one of `borda`, `plurality`, `votingForTwo`. Only `borda`
  can be analysed at the moment.
* `optLimit` (optional, default 10) is the maximum number of ballots returned
  for each question.

A single voter can also be analysed without a configuration file:

```bash
tva --ranking C,B,A,D --tally A=7,B=6,C=3,D=0 --opt-limit 3
```

## Output format

```text
{
  "config": { "contest": "Four candidates", "date": null, "votingScheme": "borda", "optLimit": 3 },
  "results": [
    {
      "voter": "Agent1",
      "sincereWinner": "A",
      "tacticalWinner": "B",
      "winnerOptions": [ ["B", "C", "D", "A"], ["B", "D", "C", "A"] ],
      "bestRank": null,
      "highestPositionOptions": []
    }
  ]
}
```

* `tacticalWinner` is the winner obtained with the first of the `winnerOptions`,
  or `null` if there is none.
* `bestRank` is the best final position of the voter's favourite candidate over
  all the `highestPositionOptions`, or `null` if there is none. The options are
  not sorted by that position.

Passing `--reference expected.json` compares the output with a previously
saved summary and prints the differences.

 */
